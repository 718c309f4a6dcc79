use printvault_core::{ExtensionRules, FileType};
use printvault_import::test_helpers::{build_zip, ZipFixture};
use printvault_import::{classify, ArchiveError, ExtractOptions, Extractor, Selection};

#[test]
fn test_only_whitelisted_entries_are_extracted() {
    let bytes = build_zip(&[
        ("model.stl", b"A"),
        ("readme.txt", b"B"),
        (".DS_Store", b"C"),
    ]);

    let result = Extractor::default().extract(&bytes, None).unwrap();

    assert_eq!(result.total_files(), 1);
    assert_eq!(result.model_count(), 1);
    assert_eq!(result.image_count(), 0);

    let file = &result.files()[0];
    assert_eq!(file.path, "model.stl");
    assert_eq!(file.filename, "model.stl");
    assert_eq!(file.file_type, FileType::Model);
    assert_eq!(file.content, b"A");
}

#[test]
fn test_nested_path_is_preserved() {
    let bytes = build_zip(&[("a/b/c/model.stl", b"x")]);

    let result = Extractor::default().extract(&bytes, None).unwrap();

    assert_eq!(result.files()[0].path, "a/b/c/model.stl");
    assert_eq!(result.files()[0].filename, "model.stl");
}

#[test]
fn test_excluded_paths_never_reach_the_manifest() {
    let bytes = ZipFixture::new()
        .dir("__MACOSX/")
        .file("__MACOSX/._model.stl", b"resource fork")
        .file("project/.hidden.stl", b"hidden")
        .file("project/Thumbs.db", b"thumbs")
        .file("project/cube.stl", b"solid")
        .file(".cache/part.stl", b"visible leaf")
        .build();

    let result = Extractor::default().extract(&bytes, None).unwrap();

    let paths: Vec<&str> = result.files().iter().map(|f| f.path.as_str()).collect();
    // Only the leaf is checked for a leading dot.
    assert_eq!(paths, vec!["project/cube.stl", ".cache/part.stl"]);
    assert_eq!(result.skipped().directories, 1);
    assert_eq!(result.skipped().excluded, 3);
}

#[test]
fn test_corrupt_bytes_are_rejected() {
    let result = Extractor::default().extract(b"PK\x03\x04 truncated nonsense", None);
    assert!(matches!(result, Err(ArchiveError::Corrupt(_))));
}

#[test]
fn test_checksum_mismatch_is_rejected_without_partial_result() {
    let content = b"solid checksum_target endsolid";
    let mut bytes = build_zip(&[("first.stl", b"fine"), ("second.stl", content)]);

    // Entries are stored uncompressed, so the content appears verbatim.
    let offset = bytes
        .windows(content.len())
        .position(|w| w == content)
        .expect("stored content present in archive");
    bytes[offset + 6] ^= 0xFF;

    let result = Extractor::default().extract(&bytes, None);
    assert!(matches!(result, Err(ArchiveError::Corrupt(_))));
}

#[test]
fn test_empty_archive() {
    let result = Extractor::default().extract(&build_zip(&[]), None).unwrap();

    assert!(result.files().is_empty());
    assert_eq!(result.total_files(), 0);
    assert_eq!(result.model_count(), 0);
    assert_eq!(result.image_count(), 0);
}

#[test]
fn test_extraction_is_repeatable() {
    let bytes = ZipFixture::new()
        .file("b.png", b"png")
        .file("a.stl", b"stl")
        .dir("parts/")
        .file("parts/c.3mf", b"3mf")
        .build();
    let extractor = Extractor::default();

    let first = extractor.extract(&bytes, None).unwrap();
    let second = extractor.extract(&bytes, None).unwrap();

    assert_eq!(first, second);
    let paths: Vec<&str> = first.files().iter().map(|f| f.path.as_str()).collect();
    assert_eq!(paths, vec!["b.png", "a.stl", "parts/c.3mf"]);
}

#[test]
fn test_counts_match_manifest() {
    let bytes = build_zip(&[
        ("a.stl", b"1"),
        ("b.3MF", b"2"),
        ("c.JPEG", b"3"),
        ("d.gif", b"4"),
        ("e.png", b"5"),
    ]);

    let result = Extractor::default().extract(&bytes, None).unwrap();

    assert_eq!(result.total_files(), result.files().len());
    assert_eq!(result.total_files(), result.model_count() + result.image_count());
    assert_eq!(result.model_count(), 2);
    assert_eq!(result.image_count(), 2);
    assert_eq!(result.skipped().unsupported, 1);
}

#[test]
fn test_classification_is_case_insensitive() {
    assert_eq!(classify("X.STL"), FileType::Model);
    assert_eq!(classify("x.stl"), FileType::Model);
    assert_eq!(classify("photo.JpG"), FileType::Image);
}

#[test]
fn test_compound_suffix_wins_regardless_of_rule_order() {
    let slices = ExtensionRules::slices();
    let reversed = ExtensionRules::new(slices.rules().iter().rev().copied());

    for rules in [&slices, &reversed] {
        let rule = rules.find("a.gcode.3mf").unwrap();
        assert_eq!(rule.suffix, ".gcode.3mf");
    }
    assert_eq!(reversed.find("plate.gcode").unwrap().suffix, ".gcode");
}

#[test]
fn test_slice_extraction_with_custom_rules() {
    let bytes = build_zip(&[("plate.gcode.3mf", b"x"), ("plate.gcode", b"y")]);
    let extractor = Extractor::new(ExtractOptions {
        rules: ExtensionRules::slices(),
        ..ExtractOptions::default()
    });

    let result = extractor.extract(&bytes, None).unwrap();

    assert_eq!(result.total_files(), 2);
    assert_eq!(result.slice_count(), 2);
    assert!(result.files().iter().all(|f| f.file_type == FileType::Slice));

    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["sliceCount"], 2);
    assert_eq!(json["modelCount"], 0);
}

#[test]
fn test_selection_over_extracted_manifest() {
    let bytes = build_zip(&[("a.stl", b"aaaa"), ("b.png", b"bb"), ("c.3mf", b"c")]);
    let result = Extractor::default().extract(&bytes, None).unwrap();

    let mut selection = Selection::new(result);
    let summary = selection.subscribe();
    assert_eq!(summary.borrow().selected, 3);

    assert!(!selection.toggle("b.png"));
    assert!(!selection.toggle("missing.stl"));
    assert_eq!(summary.borrow().selected, 2);
    assert_eq!(summary.borrow().selected_bytes, 5);

    let chosen: Vec<String> = selection
        .into_selected()
        .into_iter()
        .map(|f| f.path)
        .collect();
    assert_eq!(chosen, vec!["a.stl", "c.3mf"]);
}
