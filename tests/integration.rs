//! Integration tests for the PDF inverter

use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use pdf_invert::batch::{invert_file, run, RunOutcome};
use pdf_invert::pdf::{invert_document, load_document_file, InvertOptions};
use pdf_invert::ErrorKind;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Write a PDF whose pages each have the given size and content stream
fn write_test_pdf(path: &Path, pages: &[((i64, i64), &str)]) {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let mut kids = Vec::new();
    for ((width, height), content) in pages {
        let content_id = doc.add_object(Stream::new(
            Dictionary::new(),
            content.as_bytes().to_vec(),
        ));

        let mut page = Dictionary::new();
        page.set("Type", Object::Name(b"Page".to_vec()));
        page.set("Parent", Object::Reference(pages_id));
        page.set("Contents", Object::Reference(content_id));
        page.set(
            "MediaBox",
            Object::Array(vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Integer(*width),
                Object::Integer(*height),
            ]),
        );
        kids.push(Object::Reference(doc.add_object(page)));
    }

    let mut pages_dict = Dictionary::new();
    pages_dict.set("Type", Object::Name(b"Pages".to_vec()));
    pages_dict.set("Count", Object::Integer(kids.len() as i64));
    pages_dict.set("Kids", Object::Array(kids));
    doc.objects.insert(pages_id, Object::Dictionary(pages_dict));

    let mut catalog = Dictionary::new();
    catalog.set("Type", Object::Name(b"Catalog".to_vec()));
    catalog.set("Pages", Object::Reference(pages_id));
    let catalog_id = doc.add_object(catalog);
    doc.trailer.set("Root", Object::Reference(catalog_id));

    doc.save(path).expect("Failed to write test PDF");
}

fn first_page(doc: &Document) -> ObjectId {
    *doc.get_pages().values().next().expect("PDF has no pages")
}

fn page_text(doc: &Document, page_id: ObjectId) -> String {
    let content = doc.get_page_content(page_id).expect("Failed to read page content");
    String::from_utf8_lossy(&content).into_owned()
}

fn difference_gstate_count(doc: &Document) -> usize {
    doc.objects
        .values()
        .filter(|obj| match obj {
            Object::Dictionary(dict) => {
                matches!(dict.get(b"BM"), Ok(Object::Name(name)) if name == b"Difference")
            }
            _ => false,
        })
        .count()
}

#[test]
fn test_black_square_end_to_end() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let input = temp_dir.path().join("square.pdf");
    write_test_pdf(&input, &[((200, 100), "0 0 0 rg 10 10 50 50 re f")]);

    let output = invert_file(&input, &InvertOptions::default()).expect("Failed to invert");
    assert_eq!(output, temp_dir.path().join("square_inverted.pdf"));
    assert!(output.exists(), "Inverted PDF was not created");

    let mut doc = Document::load(&output).expect("Output is not a valid PDF");
    doc.decompress();
    let page_id = first_page(&doc);

    let contents = doc
        .get_object(page_id)
        .unwrap()
        .as_dict()
        .unwrap()
        .get(b"Contents")
        .unwrap()
        .as_array()
        .unwrap()
        .clone();
    assert_eq!(contents.len(), 3, "Expected [prefix, original, suffix]");

    let text = page_text(&doc, page_id);
    let backdrop = text.find("0 0 200 100 re").expect("Missing backdrop rectangle");
    let square = text.find("10 10 50 50 re").expect("Original content was dropped");
    let blend = text.find("/GSInvert gs").expect("Missing blend state selection");
    let overlay = text.rfind("0 0 200 100 re").unwrap();

    assert!(backdrop < square, "Backdrop must paint before the original content");
    assert!(square < blend, "Blend state must be selected after the original content");
    assert!(blend < overlay, "Overlay must paint with the blend state active");
    assert_eq!(difference_gstate_count(&doc), 1);
}

#[test]
fn test_multi_page_shares_one_gstate() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let input = temp_dir.path().join("three.pdf");
    write_test_pdf(
        &input,
        &[
            ((612, 792), "0 0 1 rg 0 0 10 10 re f"),
            ((595, 842), "1 0 0 rg 0 0 10 10 re f"),
            ((842, 595), "0 1 0 rg 0 0 10 10 re f"),
        ],
    );

    let output = invert_file(&input, &InvertOptions::default()).expect("Failed to invert");

    let mut doc = Document::load(&output).expect("Output is not a valid PDF");
    doc.decompress();
    assert_eq!(doc.get_pages().len(), 3);
    assert_eq!(difference_gstate_count(&doc), 1);

    // Each page uses its own size, never a fixed one
    let sizes = ["0 0 612 792 re", "0 0 595 842 re", "0 0 842 595 re"];
    for ((_, page_id), size) in doc.get_pages().into_iter().zip(sizes) {
        let text = page_text(&doc, page_id);
        assert_eq!(text.matches(size).count(), 2, "page {:?}: {}", page_id, text);
    }
}

#[test]
fn test_in_memory_inversion_keeps_original_stream_identity() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let input = temp_dir.path().join("identity.pdf");
    write_test_pdf(&input, &[((300, 300), "0 0 0 rg 0 0 1 1 re f")]);

    let mut doc = load_document_file(&input).expect("Failed to load");
    let page_id = first_page(&doc);
    let original = doc
        .get_object(page_id)
        .unwrap()
        .as_dict()
        .unwrap()
        .get(b"Contents")
        .unwrap()
        .clone();

    let summary = invert_document(&mut doc, &InvertOptions::default()).expect("Failed to invert");

    let contents = doc
        .get_object(page_id)
        .unwrap()
        .as_dict()
        .unwrap()
        .get(b"Contents")
        .unwrap()
        .as_array()
        .unwrap()
        .clone();
    assert_eq!(
        contents,
        vec![
            Object::Reference(summary.pages[0].prefix_id),
            original,
            Object::Reference(summary.pages[0].suffix_id),
        ]
    );
}

#[test]
fn test_batch_continues_past_corrupt_file() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    std::fs::write(temp_dir.path().join("a_corrupt.pdf"), b"%PDF-1.5 garbage")
        .expect("Failed to write corrupt file");
    write_test_pdf(&temp_dir.path().join("b_valid.pdf"), &[((200, 100), "0 0 0 rg")]);

    let outcome = run(temp_dir.path(), &InvertOptions::default(), |_| {})
        .expect("Directory run should not fail");

    let report = match outcome {
        RunOutcome::Batch(report) => report,
        RunOutcome::Single(_) => panic!("Expected a batch run for a directory"),
    };

    assert_eq!(report.total(), 2);
    assert_eq!(report.processed(), 1);
    assert_eq!(report.failed(), 1);

    let failure = report.failures().next().unwrap();
    assert_eq!(failure.input, temp_dir.path().join("a_corrupt.pdf"));
    assert_eq!(failure.error().unwrap().kind(), ErrorKind::Parse);

    assert!(temp_dir.path().join("b_valid_inverted.pdf").exists());
    assert!(!temp_dir.path().join("a_corrupt_inverted.pdf").exists());
}

#[test]
fn test_second_run_skips_previous_outputs() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    write_test_pdf(&temp_dir.path().join("report.pdf"), &[((612, 792), "0 0 0 rg")]);
    write_test_pdf(&temp_dir.path().join("Slides.PDF"), &[((612, 792), "0 0 0 rg")]);

    for _ in 0..2 {
        let outcome = run(temp_dir.path(), &InvertOptions::default(), |_| {}).unwrap();
        match outcome {
            RunOutcome::Batch(report) => {
                assert_eq!(report.total(), 2);
                assert_eq!(report.processed(), 2);
            }
            RunOutcome::Single(_) => panic!("Expected a batch run for a directory"),
        }
    }

    let mut names: Vec<String> = std::fs::read_dir(temp_dir.path())
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    assert_eq!(
        names,
        vec!["Slides.PDF", "Slides_inverted.pdf", "report.pdf", "report_inverted.pdf"]
    );
}

#[test]
fn test_single_file_run_overwrites_output() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let input = temp_dir.path().join("report.pdf");
    let output = temp_dir.path().join("report_inverted.pdf");
    write_test_pdf(&input, &[((612, 792), "0 0 0 rg")]);
    std::fs::write(&output, b"stale").unwrap();

    let outcome = run(&input, &InvertOptions::default(), |_| {}).unwrap();

    match outcome {
        RunOutcome::Single(file) => assert_eq!(file.output(), Some(output.as_path())),
        RunOutcome::Batch(_) => panic!("Expected a single-file run"),
    }
    let bytes = std::fs::read(&output).unwrap();
    assert!(bytes.starts_with(b"%PDF-"), "Stale output was not overwritten");
}

#[test]
fn test_run_rejects_bad_paths() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let notes = temp_dir.path().join("notes.txt");
    std::fs::write(&notes, b"not a pdf").unwrap();

    let missing = run(&PathBuf::from("definitely/not/here"), &InvertOptions::default(), |_| {});
    assert_eq!(missing.unwrap_err().kind(), ErrorKind::PathNotFound);

    let not_pdf = run(&notes, &InvertOptions::default(), |_| {});
    assert_eq!(not_pdf.unwrap_err().kind(), ErrorKind::InvalidInput);
}

#[test]
fn test_zero_page_document_passes_through() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let input = temp_dir.path().join("blank.pdf");
    write_test_pdf(&input, &[]);

    let output = invert_file(&input, &InvertOptions::default()).expect("Failed to invert");

    let doc = Document::load(&output).expect("Output is not a valid PDF");
    assert!(doc.get_pages().is_empty());
}
