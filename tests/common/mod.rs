use std::io::Write;
use std::path::Path;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Writes a one-sheet xlsx where every string goes through the shared
/// string table, the way spreadsheet apps save them.
pub fn write_workbook(path: &Path, rows: &[Vec<&str>]) {
    let mut shared: Vec<String> = Vec::new();
    let mut sheet = String::from(
        r#"<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData>"#,
    );

    for (r, cells) in rows.iter().enumerate() {
        sheet.push_str(&format!(r#"<row r="{}">"#, r + 1));
        for (c, value) in cells.iter().enumerate() {
            if value.is_empty() {
                continue;
            }
            let reference = format!("{}{}", (b'A' + c as u8) as char, r + 1);
            if value.parse::<f64>().is_ok() {
                sheet.push_str(&format!(r#"<c r="{}"><v>{}</v></c>"#, reference, value));
            } else {
                let index = match shared.iter().position(|s| s == value) {
                    Some(i) => i,
                    None => {
                        shared.push(value.to_string());
                        shared.len() - 1
                    }
                };
                sheet.push_str(&format!(r#"<c r="{}" t="s"><v>{}</v></c>"#, reference, index));
            }
        }
        sheet.push_str("</row>");
    }
    sheet.push_str("</sheetData></worksheet>");

    let mut sst = String::from(
        r#"<sst xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">"#,
    );
    for s in &shared {
        let escaped = s.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;");
        sst.push_str(&format!("<si><t>{}</t></si>", escaped));
    }
    sst.push_str("</sst>");

    let workbook = r#"<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets><sheet name="Hall of Fame" sheetId="1" r:id="rId1"/></sheets></workbook>"#;
    let rels = r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="/xl/worksheets/sheet1.xml"/></Relationships>"#;

    let file = std::fs::File::create(path).unwrap();
    let mut zip = ZipWriter::new(file);
    let options = FileOptions::default().compression_method(CompressionMethod::Deflated);
    for (name, body) in [
        ("xl/workbook.xml", workbook.to_string()),
        ("xl/_rels/workbook.xml.rels", rels.to_string()),
        ("xl/sharedStrings.xml", sst),
        ("xl/worksheets/sheet1.xml", sheet),
    ] {
        zip.start_file(name, options).unwrap();
        zip.write_all(body.as_bytes()).unwrap();
    }
    zip.finish().unwrap();
}

pub fn header() -> Vec<&'static str> {
    vec![
        "Rank",
        "ProfileImage",
        "CollectorName",
        "Nickname",
        "Total_Minifigs",
        "Total_Points",
        "Special_Title",
    ]
}
