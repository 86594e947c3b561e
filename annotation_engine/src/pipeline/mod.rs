mod engine;
mod error;
mod result;

// Re-export public types
pub use crate::reader::get_single;
pub use engine::AnnotationEngine;
pub use error::AnnotationError;
pub use result::{ElementReport, PipelineResult};

use crate::logging;
use crate::reader::{AnnotationReader, DeclaringElement};
use crate::registry::{load_unit, AnnotationRegistry, ClassDefinition};
use std::path::PathBuf;
use std::time::Instant;

/// Process one source unit (load -> register -> read every declared element)
///
/// Loading and registering failures fail the file. Each element is read in
/// isolation, so a malformed docblock only marks its own report as failed.
pub fn process_file(
    file_path: &str,
    registry: &AnnotationRegistry,
    reader: &AnnotationReader,
) -> Result<PipelineResult, AnnotationError> {
    let start_time = Instant::now();

    logging::with_file_context(PathBuf::from(file_path), 0, || {
        crate::log_info!("Starting source unit processing", "file" => file_path);

        // Stage 1: source unit
        let unit = load_unit(&PathBuf::from(file_path))?;

        // Stage 2: registration
        let classes = registry.register_unit(&unit)?;

        // Stage 3: element reading
        let mut elements = Vec::new();
        for name in &classes {
            match reader.class(name) {
                Ok(class) => elements.extend(read_class(reader, &class)),
                Err(error) => {
                    elements.push(ElementReport::new(format!("class {}", name), Err(error)))
                }
            }
        }

        let result = PipelineResult::new(
            PathBuf::from(file_path),
            classes,
            elements,
            start_time.elapsed(),
        );

        result.log_success(file_path);

        Ok(result)
    })
}

/// Read the class docblock and every member the class itself declares
pub fn read_class(reader: &AnnotationReader, class: &ClassDefinition) -> Vec<ElementReport> {
    let mut reports = Vec::with_capacity(1 + class.methods.len() + class.properties.len());

    let element = DeclaringElement::Class(class);
    reports.push(ElementReport::new(element.context(), reader.read(element)));

    for method in &class.methods {
        let element = DeclaringElement::Method { class, method };
        reports.push(ElementReport::new(element.context(), reader.read(element)));
    }

    for property in &class.properties {
        let element = DeclaringElement::Property { class, property };
        reports.push(ElementReport::new(element.context(), reader.read(element)));
    }

    reports
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::Value;
    use crate::registry::RegistryError;
    use assert_matches::assert_matches;
    use std::sync::Arc;

    const MAPPING_UNIT: &str = r#"
namespace = "Acme\\Mapping"

[[classes]]
name = "Entity"
doc = "/** @Annotation @Target(\"CLASS\") */"

[[classes.properties]]
name = "table"
doc = "/** @var string */"

[[classes]]
name = "Column"
doc = "/** @Annotation @Target(\"PROPERTY\") */"

[[classes.properties]]
name = "type"
doc = "/** @var string @Required */"
"#;

    const BLOG_UNIT: &str = r#"
namespace = "Acme\\Blog"

[imports]
ORM = "Acme\\Mapping"

[[classes]]
name = "Post"
doc = "/** @ORM\\Entity(table=\"posts\") */"

[[classes.properties]]
name = "title"
doc = "/** @ORM\\Column(type=\"string\") */"

[[classes.properties]]
name = "body"
doc = "/** @ORM\\Column */"

[[classes.methods]]
name = "publish"
doc = "/** @return void */"
"#;

    fn setup() -> (tempfile::TempDir, Arc<AnnotationRegistry>, AnnotationReader) {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("mapping.toml"), MAPPING_UNIT).unwrap();
        std::fs::write(dir.path().join("blog.toml"), BLOG_UNIT).unwrap();

        let registry = Arc::new(AnnotationRegistry::new());
        registry
            .register_file(&dir.path().join("mapping.toml"))
            .unwrap();
        let reader = AnnotationReader::new(registry.clone());
        (dir, registry, reader)
    }

    #[test]
    fn test_process_file_isolates_elements() {
        let (dir, registry, reader) = setup();
        let path = dir.path().join("blog.toml");
        let result = process_file(path.to_str().unwrap(), &registry, &reader).unwrap();

        assert_eq!(result.classes, vec!["Acme\\Blog\\Post".to_string()]);
        assert_eq!(result.elements.len(), 4);
        assert_eq!(result.error_count(), 1);
        assert_eq!(result.annotation_count(), 2);

        let failed: Vec<_> = result.failed_elements().collect();
        assert_eq!(failed[0].element, "property Acme\\Blog\\Post::$body");

        let class_report = &result.elements[0];
        let entity = class_report.outcome.as_ref().unwrap();
        assert_eq!(entity[0].get("table"), Some(&Value::from("posts")));
    }

    #[test]
    fn test_json_output() {
        let (dir, registry, reader) = setup();
        let path = dir.path().join("blog.toml");
        let result = process_file(path.to_str().unwrap(), &registry, &reader).unwrap();

        let json = result.to_json();
        assert_eq!(json["errors"], 1);
        assert_eq!(json["elements"][0]["element"], "class Acme\\Blog\\Post");
        assert_eq!(
            json["elements"][0]["annotations"][0]["class"],
            "Acme\\Mapping\\Entity"
        );
        assert!(json["elements"][3]["error"]
            .as_str()
            .unwrap()
            .starts_with("[Type Error]"));
    }

    #[test]
    fn test_missing_file_fails() {
        let (dir, registry, reader) = setup();
        let path = dir.path().join("missing.toml");
        assert_matches!(
            process_file(path.to_str().unwrap(), &registry, &reader),
            Err(AnnotationError::Registry(RegistryError::Io { .. }))
        );
    }

    #[test]
    fn test_get_single_reexport() {
        let annotations = vec![
            crate::grammar::Annotation::new("Acme\\A"),
            crate::grammar::Annotation::new("Acme\\B"),
        ];
        assert!(get_single(annotations.clone(), "\\acme\\b").is_some());
        assert!(get_single(annotations, "Acme\\C").is_none());
    }
}
