//! SourceLayout (§4.5): the fixed on-disk directory tree for the editable
//! source form, and the writer/reader pair that shards a `Document` into it
//! and reassembles one from it.

mod error;
mod fs_util;
mod json;
mod manifest;
mod paths;
mod read;
mod write;

pub use error::Error;
pub use read::read_source_tree;
pub use write::write_source_tree;

#[cfg(test)]
mod test {
    use pasrc_diag::ErrorContainer;
    use pasrc_model::{Document, IrBlock, PropNode, TypeRef, TypedName};

    use super::*;

    fn temp_dir(label: &str) -> std::path::PathBuf {
        let mut dir = std::env::temp_dir();
        dir.push(format!("pasrc-layout-test-{label}-{}", std::process::id()));
        dir
    }

    fn sample_document() -> Document {
        let mut doc = Document::empty();
        doc.format_version = Some(pasrc_model::FormatVersion::CURRENT);
        doc.screen_order = vec!["Screen1".into()];

        let mut screen = IrBlock::new(TypedName {
            identifier: "Screen1".into(),
            kind: TypeRef { type_name: "Screen".into(), optional_variant: None },
        });
        screen.properties.push(PropNode { identifier: "Fill".into(), expression: "RGBA(0,0,0,1)".into() });
        let mut label = IrBlock::new(TypedName {
            identifier: "Label1".into(),
            kind: TypeRef { type_name: "Classic/Label".into(), optional_variant: None },
        });
        label.properties.push(PropNode { identifier: "Text".into(), expression: "\"hi\"".into() });
        screen.children.push(label);
        doc.screens.insert("Screen1".into(), screen);

        doc
    }

    #[test]
    fn write_then_read_round_trips_a_screen() {
        let dir = temp_dir("screen");
        let _ = std::fs::remove_dir_all(&dir);

        let doc = sample_document();
        write_source_tree(&doc, &dir).unwrap();

        let mut errors = ErrorContainer::new();
        let reloaded = read_source_tree(&dir, &mut errors).unwrap();

        assert!(errors.is_empty());
        assert_eq!(reloaded.screen_order, doc.screen_order);
        assert_eq!(reloaded.screens.get("Screen1"), doc.screens.get("Screen1"));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn malformed_screen_is_reported_but_others_still_load() {
        let dir = temp_dir("malformed");
        let _ = std::fs::remove_dir_all(&dir);

        let doc = sample_document();
        write_source_tree(&doc, &dir).unwrap();

        std::fs::write(dir.join("Src/Broken.pa.yaml"), "not a valid header\n").unwrap();

        let mut errors = ErrorContainer::new();
        let reloaded = read_source_tree(&dir, &mut errors).unwrap();

        assert!(errors.has_fatal());
        assert!(reloaded.screens.contains_key("Screen1"));
        assert!(!reloaded.screens.contains_key("Broken"));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn unsupported_format_version_is_fatal() {
        let dir = temp_dir("version");
        let _ = std::fs::remove_dir_all(&dir);

        let doc = sample_document();
        write_source_tree(&doc, &dir).unwrap();

        let manifest_path = dir.join("CanvasManifest.json");
        let mut value: serde_json::Value = serde_json::from_slice(&std::fs::read(&manifest_path).unwrap()).unwrap();
        value["formatVersion"] = serde_json::Value::String("0.1".into());
        std::fs::write(&manifest_path, serde_json::to_vec(&value).unwrap()).unwrap();

        let mut errors = ErrorContainer::new();
        let err = read_source_tree(&dir, &mut errors).unwrap_err();
        assert!(matches!(err, Error::FormatNotSupported { .. }));

        let _ = std::fs::remove_dir_all(&dir);
    }
}
