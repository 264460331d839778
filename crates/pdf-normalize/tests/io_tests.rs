use lopdf::{Dictionary, Document, Object, Stream};
use pdf_normalize::*;

fn create_test_pdf(num_pages: usize) -> Document {
    let mut doc = Document::with_version("1.7");

    // Create page tree root ID
    let pages_id = doc.new_object_id();

    // Create pages array
    let mut kids = Vec::new();
    for _ in 0..num_pages {
        let content_id = doc.add_object(Stream::new(Dictionary::new(), b"q Q".to_vec()));

        let page_id = doc.add_object(Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Page".to_vec())),
            ("Parent", Object::Reference(pages_id)),
            (
                "MediaBox",
                Object::Array(vec![
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Integer(612),
                    Object::Integer(792),
                ]),
            ),
            ("Resources", Object::Dictionary(Dictionary::new())),
            ("Contents", Object::Reference(content_id)),
        ]));
        kids.push(Object::Reference(page_id));
    }

    let pages_dict = Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Pages".to_vec())),
        ("Kids", Object::Array(kids)),
        ("Count", Object::Integer(num_pages as i64)),
    ]);
    doc.objects.insert(pages_id, Object::Dictionary(pages_dict));

    let catalog_id = doc.add_object(Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Catalog".to_vec())),
        ("Pages", Object::Reference(pages_id)),
    ]));

    doc.trailer.set("Root", catalog_id);

    doc
}

#[test]
fn test_bytes_round_trip() {
    let mut doc = create_test_pdf(3);
    let bytes = save_pdf_bytes(&mut doc).unwrap();
    assert!(bytes.starts_with(b"%PDF-1.7"));

    let loaded = load_pdf_bytes(&bytes, true).unwrap();
    assert_eq!(loaded.get_pages().len(), 3);
}

#[test]
fn test_load_invalid_bytes() {
    match load_pdf_bytes(b"not a pdf at all", true) {
        Err(NormalizeError::Load(_)) => {}
        other => panic!("Expected Load error, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn test_unencrypted_loads_without_bypass() {
    let mut doc = create_test_pdf(1);
    let bytes = save_pdf_bytes(&mut doc).unwrap();
    assert!(load_pdf_bytes(&bytes, false).is_ok());
}

#[tokio::test]
async fn test_load_pdf() {
    use tempfile::NamedTempFile;

    let mut doc = create_test_pdf(5);
    let temp = NamedTempFile::new().unwrap();
    let path = temp.path();

    let mut writer = Vec::new();
    doc.save_to(&mut writer).unwrap();
    std::fs::write(path, writer).unwrap();

    let loaded = load_pdf(path, true).await.unwrap();
    assert_eq!(loaded.get_pages().len(), 5);
}

#[tokio::test]
async fn test_load_missing_file() {
    let result = load_pdf("/nonexistent/input.pdf", true).await;
    assert!(matches!(result, Err(NormalizeError::Io(_))));
}

#[tokio::test]
async fn test_save_pdf() {
    use tempfile::NamedTempFile;

    let doc = create_test_pdf(2);
    let temp = NamedTempFile::new().unwrap();

    save_pdf(doc, temp.path()).await.unwrap();

    // Verify file was created and can be loaded
    assert!(temp.path().exists());
    let loaded = Document::load(temp.path()).unwrap();
    assert_eq!(loaded.get_pages().len(), 2);
}
