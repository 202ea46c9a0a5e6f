//! PkgLoader/PkgWriter (§4.6): the archive <-> `Document` boundary, and the
//! Document state machine's load/write half (the source-tree half lives in
//! `pasrc-layout`).

mod checksum;
mod config;
mod error;
mod kind;
mod loader;
mod writer;

pub use config::{Config, ConfigGet, ConfigSet};
pub use error::Error;
pub use loader::load_pkg;
pub use writer::write_pkg;

#[cfg(test)]
mod test {
    use std::io::Cursor;

    use pasrc_diag::ErrorContainer;
    use pasrc_model::{Document, IrBlock, PropNode, TypeRef, TypedName};

    use super::*;

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

    /// P1 (semantic pack-unpack idempotence): `checksum(A) == checksum(pack(unpack(A)))`.
    #[test]
    fn pack_unpack_round_trip_preserves_checksum() {
        let mut doc = sample_document();
        let config = Config::new();

        let mut first = Cursor::new(Vec::new());
        let checksum_a = write_pkg(&mut doc, &mut first).unwrap();

        first.set_position(0);
        let mut errors = ErrorContainer::new();
        let mut unpacked = load_pkg(first, &config, &mut errors).unwrap();
        assert!(errors.is_empty());

        let mut second = Cursor::new(Vec::new());
        let checksum_b = write_pkg(&mut unpacked, &mut second).unwrap();

        assert_eq!(checksum_a, checksum_b);
    }

    /// P5 (z-order) survives a pack/unpack round trip end to end.
    #[test]
    fn z_order_survives_round_trip() {
        let mut doc = Document::empty();
        doc.format_version = Some(pasrc_model::FormatVersion::CURRENT);
        doc.screen_order = vec!["Screen1".into()];

        let mut screen = IrBlock::new(TypedName {
            identifier: "Screen1".into(),
            kind: TypeRef { type_name: "Screen".into(), optional_variant: None },
        });
        for (name, z) in [("A", "2"), ("B", "1"), ("C", "foo")] {
            let mut child = IrBlock::new(TypedName {
                identifier: name.into(),
                kind: TypeRef { type_name: "Classic/Label".into(), optional_variant: None },
            });
            child.properties.push(PropNode { identifier: "ZIndex".into(), expression: z.into() });
            screen.children.push(child);
        }
        doc.screens.insert("Screen1".into(), screen);

        let config = Config::new();
        let mut buf = Cursor::new(Vec::new());
        write_pkg(&mut doc, &mut buf).unwrap();
        buf.set_position(0);

        let mut errors = ErrorContainer::new();
        let reloaded = load_pkg(buf, &config, &mut errors).unwrap();
        let names: Vec<&str> =
            reloaded.screens["Screen1"].children.iter().map(|c| c.name.identifier.as_str()).collect();
        assert_eq!(names, vec!["C", "B", "A"]);
    }

    /// P1 for mixed-case passthrough entries: a lowercase lookup key must
    /// not leak into the archive path the checksum is computed over.
    #[test]
    fn unknown_file_case_survives_round_trip() {
        let mut doc = sample_document();
        doc.unknown_files.insert(
            pasrc_path::normalize("ComponentReferences.json"),
            pasrc_model::UnknownBlob::new(b"{}".to_vec(), "ComponentReferences.json".to_string()),
        );

        let config = Config::new();

        let mut first = Cursor::new(Vec::new());
        let checksum_a = write_pkg(&mut doc, &mut first).unwrap();

        first.set_position(0);
        let mut errors = ErrorContainer::new();
        let mut unpacked = load_pkg(first, &config, &mut errors).unwrap();
        assert!(errors.is_empty());

        let blob = unpacked.unknown_files.values().next().unwrap();
        assert_eq!(blob.display_name, "ComponentReferences.json");

        let mut second = Cursor::new(Vec::new());
        let checksum_b = write_pkg(&mut unpacked, &mut second).unwrap();
        assert_eq!(checksum_a, checksum_b);
    }

    /// P8 (entropy-absent robustness): dropping `Entropy.json` still yields
    /// a deterministic repack.
    #[test]
    fn missing_entropy_still_packs_deterministically() {
        let mut doc = sample_document();
        doc.entropy = pasrc_model::Entropy::new();

        let mut buf = Cursor::new(Vec::new());
        let sum = write_pkg(&mut doc, &mut buf).unwrap();
        assert!(!sum.is_empty());
        assert_eq!(doc.entropy.control_unique_ids.get("Label1"), Some(&1));
        assert_eq!(doc.entropy.control_unique_ids.get("Screen1"), Some(&2));
    }
}
