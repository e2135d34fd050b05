// Gemeinsame Archiv-Fixtures fuer die Integrationstests.
//
// Wird per `include!` eingebunden. Benoetigte Imports muessen VOR dem
// `include!` vorhanden sein:
//   use std::io::{Read, Write};
//   use std::path::Path;

const ODT_TEXT_NS: &str = "urn:oasis:names:tc:opendocument:xmlns:text:1.0";
const DOCX_W_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
const ODT_MIMETYPE: &[u8] = b"application/vnd.oasis.opendocument.text";

fn odt_content_xml(body: &str) -> String {
    format!(
        concat!(
            r#"<?xml version="1.0" encoding="UTF-8"?>"#,
            r#"<office:document-content"#,
            r#" xmlns:office="urn:oasis:names:tc:opendocument:xmlns:office:1.0""#,
            r#" xmlns:text="{ns}">"#,
            r#"<office:body><office:text>{body}</office:text></office:body>"#,
            r#"</office:document-content>"#,
        ),
        ns = ODT_TEXT_NS,
        body = body,
    )
}

fn docx_document_xml(body: &str) -> String {
    format!(
        concat!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
            r#"<w:document xmlns:w="{ns}"><w:body>{body}</w:body></w:document>"#,
        ),
        ns = DOCX_W_NS,
        body = body,
    )
}

/// Schreibt ein ODT-Archiv: `mimetype` (Stored, erster Eintrag),
/// `content.xml` (Deflated), plus beliebige Extra-Eintraege.
fn write_odt(path: &Path, content_xml: &str, extra: &[(&str, &[u8])]) {
    let file = std::fs::File::create(path).expect("create odt");
    let mut zip = zip::ZipWriter::new(file);
    let stored = zip::write::SimpleFileOptions::default()
        .compression_method(zip::CompressionMethod::Stored);
    zip.start_file("mimetype", stored).expect("mimetype");
    zip.write_all(ODT_MIMETYPE).expect("mimetype body");
    let deflated = zip::write::SimpleFileOptions::default()
        .compression_method(zip::CompressionMethod::Deflated);
    zip.start_file("content.xml", deflated).expect("content.xml");
    zip.write_all(content_xml.as_bytes()).expect("content body");
    for (name, data) in extra {
        zip.start_file(*name, deflated).expect("extra entry");
        zip.write_all(data).expect("extra body");
    }
    zip.finish().expect("finish odt");
}

/// Schreibt ein minimales DOCX-Archiv mit `word/document.xml`.
fn write_docx(path: &Path, document_xml: &str, extra: &[(&str, &[u8])]) {
    let file = std::fs::File::create(path).expect("create docx");
    let mut zip = zip::ZipWriter::new(file);
    let deflated = zip::write::SimpleFileOptions::default()
        .compression_method(zip::CompressionMethod::Deflated);
    zip.start_file("[Content_Types].xml", deflated)
        .expect("content types");
    zip.write_all(
        concat!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
            r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#,
            r#"<Default Extension="xml" ContentType="application/xml"/>"#,
            r#"</Types>"#,
        )
        .as_bytes(),
    )
    .expect("content types body");
    zip.start_file("word/document.xml", deflated)
        .expect("document.xml");
    zip.write_all(document_xml.as_bytes()).expect("document body");
    for (name, data) in extra {
        zip.start_file(*name, deflated).expect("extra entry");
        zip.write_all(data).expect("extra body");
    }
    zip.finish().expect("finish docx");
}

/// Liest einen Eintrag (dekomprimiert) aus einem Archiv.
fn read_entry(path: &Path, name: &str) -> Vec<u8> {
    let file = std::fs::File::open(path).expect("open zip");
    let mut zip = zip::ZipArchive::new(file).expect("read zip");
    let mut entry = zip.by_name(name).expect("entry");
    let mut buf = Vec::new();
    entry.read_to_end(&mut buf).expect("read entry");
    buf
}

/// Eintragsnamen in Archiv-Reihenfolge.
#[allow(dead_code)]
fn entry_names(path: &Path) -> Vec<String> {
    let file = std::fs::File::open(path).expect("open zip");
    let mut zip = zip::ZipArchive::new(file).expect("read zip");
    (0..zip.len())
        .map(|i| zip.by_index(i).expect("entry").name().to_string())
        .collect()
}
