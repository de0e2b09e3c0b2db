// src/services/import_service.rs
use crate::{
    error::{AppError, AppResult},
    models::student::{Gender, NewStudent},
};
use calamine::{open_workbook_auto_from_rs, Data, Reader};
use std::io::Cursor;

pub const COLUMN_NAME: &str = "Nama Siswa";
pub const COLUMN_CLASS: &str = "Kelas";
pub const COLUMN_GENDER: &str = "Jenis Kelamin";

/// Extensions accepted by the student import form.
pub const ACCEPTED_EXTENSIONS: [&str; 4] = ["xlsx", "xls", "ods", "csv"];

/// Reads the first sheet of an uploaded roster. The first row is the header;
/// rows without a name or class are dropped.
pub fn parse_student_file(filename: &str, bytes: &[u8]) -> AppResult<Vec<NewStudent>> {
    let extension = filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_lowercase())
        .unwrap_or_default();

    let rows = match extension.as_str() {
        "csv" => csv_rows(bytes),
        "xlsx" | "xls" | "ods" => workbook_rows(bytes)?,
        _ => {
            return Err(AppError::Import(format!(
                "Format file tidak didukung. Gunakan salah satu dari: {}.",
                ACCEPTED_EXTENSIONS.join(", ")
            )))
        }
    };

    let students = students_from_rows(&rows);
    tracing::info!(
        "Parsed '{}': {} data rows, {} usable students",
        filename,
        rows.len().saturating_sub(1),
        students.len()
    );
    Ok(students)
}

fn workbook_rows(bytes: &[u8]) -> AppResult<Vec<Vec<String>>> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec())).map_err(|e| {
        tracing::warn!("Could not open workbook: {}", e);
        AppError::Import("File tidak dapat dibaca sebagai spreadsheet.".to_string())
    })?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| AppError::Import("Spreadsheet tidak memiliki sheet.".to_string()))?
        .map_err(|e| {
            tracing::warn!("Could not read first sheet: {}", e);
            AppError::Import("Sheet pertama tidak dapat dibaca.".to_string())
        })?;

    Ok(range
        .rows()
        .map(|row| row.iter().map(cell_text).collect())
        .collect())
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        // whole numbers (e.g. a class typed as 7) should not render as "7.0"
        Data::Float(f) if f.fract() == 0.0 => format!("{}", *f as i64),
        other => other.to_string(),
    }
}

fn csv_rows(bytes: &[u8]) -> Vec<Vec<String>> {
    let text = String::from_utf8_lossy(bytes);
    let text = text.trim_start_matches('\u{feff}');
    let mut lines = text.lines().filter(|l| !l.trim().is_empty()).peekable();

    // spreadsheet exports in some locales separate with ';'
    let delimiter = match lines.peek() {
        Some(header) if header.contains(';') && !header.contains(',') => ';',
        _ => ',',
    };

    lines
        .map(|line| parse_csv_record(line, delimiter))
        .collect()
}

/// Splits one CSV line, honouring double-quoted fields and `""` escapes.
fn parse_csv_record(line: &str, delimiter: char) -> Vec<String> {
    let mut out = Vec::new();
    let mut cur = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch == '"' {
            if in_quotes && chars.peek() == Some(&'"') {
                cur.push('"');
                chars.next();
            } else {
                in_quotes = !in_quotes;
            }
            continue;
        }
        if ch == delimiter && !in_quotes {
            out.push(cur.clone());
            cur.clear();
            continue;
        }
        cur.push(ch);
    }
    out.push(cur);
    out
}

fn students_from_rows(rows: &[Vec<String>]) -> Vec<NewStudent> {
    let Some((header, body)) = rows.split_first() else {
        return Vec::new();
    };
    let column = |name: &str| header.iter().position(|h| h.trim().eq_ignore_ascii_case(name));
    let (name_col, class_col, gender_col) = (
        column(COLUMN_NAME),
        column(COLUMN_CLASS),
        column(COLUMN_GENDER),
    );
    if name_col.is_none() || class_col.is_none() {
        tracing::warn!(
            "Header row lacks '{}' or '{}'; every row will be skipped",
            COLUMN_NAME,
            COLUMN_CLASS
        );
    }

    let cell = |row: &Vec<String>, col: Option<usize>| -> String {
        col.and_then(|i| row.get(i))
            .map(|v| v.trim().to_string())
            .unwrap_or_default()
    };

    body.iter()
        .filter_map(|row| {
            let name = cell(row, name_col);
            let class_name = cell(row, class_col);
            if name.is_empty() || class_name.is_empty() {
                return None;
            }
            Some(NewStudent {
                name,
                class_name,
                gender: Gender::from_cell(&cell(row, gender_col)),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn csv_record_handles_quotes() {
        assert_eq!(
            parse_csv_record(r#"a,"b, c","say ""hi""""#, ','),
            vec!["a", "b, c", r#"say "hi""#]
        );
        assert_eq!(parse_csv_record("x;;z", ';'), vec!["x", "", "z"]);
    }

    #[test]
    fn csv_roster_maps_columns_and_drops_incomplete_rows() {
        let csv = "\u{feff}Nama Siswa,Kelas,Jenis Kelamin\n\
                   Andi Pratama,VII-A,Laki-laki\n\
                   Siti Aminah , VII-B ,Perempuan\n\
                   ,VII-C,Perempuan\n\
                   Tanpa Kelas,,Laki-laki\n\
                   Rina,VIII-A,\n";

        let students = parse_student_file("siswa.csv", csv.as_bytes()).unwrap();

        assert_eq!(students.len(), 3);
        assert_eq!(students[0].name, "Andi Pratama");
        assert_eq!(students[1].name, "Siti Aminah");
        assert_eq!(students[1].class_name, "VII-B");
        assert_eq!(students[1].gender, Gender::Female);
        assert_eq!(students[2].gender, Gender::Male);
    }

    #[test]
    fn semicolon_separated_export_is_detected() {
        let csv = "Kelas;Nama Siswa\r\nIX-A;Dewi\r\n";
        let students = parse_student_file("SISWA.CSV", csv.as_bytes()).unwrap();
        assert_eq!(students.len(), 1);
        assert_eq!(students[0].name, "Dewi");
        assert_eq!(students[0].class_name, "IX-A");
    }

    #[test]
    fn missing_header_columns_yield_nothing() {
        let csv = "Nama,Rombel\nAndi,VII-A\n";
        assert!(parse_student_file("a.csv", csv.as_bytes()).unwrap().is_empty());
        assert!(parse_student_file("empty.csv", b"").unwrap().is_empty());
    }

    #[test]
    fn unknown_extension_and_broken_workbook_are_rejected() {
        assert!(matches!(
            parse_student_file("siswa.txt", b"Nama Siswa,Kelas"),
            Err(AppError::Import(_))
        ));
        assert!(matches!(
            parse_student_file("siswa.xlsx", b"not a zip archive"),
            Err(AppError::Import(_))
        ));
    }

    #[test]
    fn whole_number_cells_render_without_fraction() {
        assert_eq!(cell_text(&Data::Float(7.0)), "7");
        assert_eq!(cell_text(&Data::String("VII-A".into())), "VII-A");
        assert_eq!(cell_text(&Data::Empty), "");
    }
}
