use super::error::AnnotationError;
use crate::grammar::Annotation;
use std::path::PathBuf;
use std::time::Duration;

/// Annotations read from one declaring element, or the error that stopped it
#[derive(Debug)]
pub struct ElementReport {
    /// Element as named in error messages, e.g. `method Acme\Post::publish()`
    pub element: String,
    pub outcome: Result<Vec<Annotation>, AnnotationError>,
}

impl ElementReport {
    pub fn new(element: String, outcome: Result<Vec<Annotation>, AnnotationError>) -> Self {
        Self { element, outcome }
    }

    pub fn is_error(&self) -> bool {
        self.outcome.is_err()
    }

    pub fn to_json(&self) -> serde_json::Value {
        match &self.outcome {
            Ok(annotations) => serde_json::json!({
                "element": self.element,
                "annotations": annotations,
            }),
            Err(error) => serde_json::json!({
                "element": self.element,
                "error": error.to_string(),
                "code": error.error_code().as_str(),
            }),
        }
    }
}

/// Everything read from one source unit
#[derive(Debug)]
pub struct PipelineResult {
    pub file_path: PathBuf,
    pub classes: Vec<String>,
    pub elements: Vec<ElementReport>,
    pub processing_duration: Duration,
}

impl PipelineResult {
    pub fn new(
        file_path: PathBuf,
        classes: Vec<String>,
        elements: Vec<ElementReport>,
        processing_duration: Duration,
    ) -> Self {
        Self {
            file_path,
            classes,
            elements,
            processing_duration,
        }
    }

    pub fn annotation_count(&self) -> usize {
        self.elements
            .iter()
            .filter_map(|e| e.outcome.as_ref().ok())
            .map(Vec::len)
            .sum()
    }

    pub fn error_count(&self) -> usize {
        self.elements.iter().filter(|e| e.is_error()).count()
    }

    pub fn has_errors(&self) -> bool {
        self.elements.iter().any(ElementReport::is_error)
    }

    pub fn failed_elements(&self) -> impl Iterator<Item = &ElementReport> {
        self.elements.iter().filter(|e| e.is_error())
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "file": self.file_path.display().to_string(),
            "classes": self.classes,
            "elements": self.elements.iter().map(ElementReport::to_json).collect::<Vec<_>>(),
            "annotations": self.annotation_count(),
            "errors": self.error_count(),
            "duration_ms": self.processing_duration.as_secs_f64() * 1000.0,
        })
    }

    pub fn log_success(&self, file_path: &str) {
        crate::log_success!(
            crate::logging::codes::success::FILE_PROCESSING_SUCCESS,
            "Source unit processed",
            "file" => file_path,
            "classes" => self.classes.len(),
            "elements" => self.elements.len(),
            "annotations" => self.annotation_count(),
            "element_errors" => self.error_count(),
            "duration_ms" => format!("{:.2}", self.processing_duration.as_secs_f64() * 1000.0)
        );
    }
}
