//! CSV 写出（Excel 习惯：必要时加双引号，`\r\n` 换行）

use std::io::{self, Write};

use ocr_quality::Cell;

const LINE_END: &[u8] = b"\r\n";

pub struct CsvWriter<W: Write> {
    inner: W,
    rows: usize,
}

impl<W: Write> CsvWriter<W> {
    pub fn new(inner: W) -> Self {
        Self { inner, rows: 0 }
    }

    pub fn write_record<I, S>(&mut self, fields: I) -> io::Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for (index, field) in fields.into_iter().enumerate() {
            if index > 0 {
                self.inner.write_all(b",")?;
            }
            self.inner.write_all(escape(field.as_ref()).as_bytes())?;
        }
        self.inner.write_all(LINE_END)?;
        self.rows += 1;
        Ok(())
    }

    pub fn write_cells<'a, I>(&mut self, cells: I) -> io::Result<()>
    where
        I: IntoIterator<Item = &'a Cell>,
    {
        self.write_record(cells.into_iter().map(|cell| cell.to_string()))
    }

    /// 已写出的行数（含表头）
    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn into_inner(mut self) -> io::Result<W> {
        self.inner.flush()?;
        Ok(self.inner)
    }
}

fn escape(field: &str) -> std::borrow::Cow<'_, str> {
    if field.contains(&[',', '"', '\r', '\n'][..]) {
        format!("\"{}\"", field.replace('"', "\"\"")).into()
    } else {
        field.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn written(rows: &[&[&str]]) -> String {
        let mut writer = CsvWriter::new(Vec::new());
        for row in rows {
            writer.write_record(row.iter()).unwrap();
        }
        String::from_utf8(writer.into_inner().unwrap()).unwrap()
    }

    #[test]
    fn test_plain_fields() {
        assert_eq!(written(&[&["a", "b"], &["1", ""]]), "a,b\r\n1,\r\n");
    }

    #[test]
    fn test_special_characters_are_quoted() {
        assert_eq!(
            written(&[&[",", "say \"hi\"", "two\nlines", "x"]]),
            "\",\",\"say \"\"hi\"\"\",\"two\nlines\",x\r\n"
        );
    }

    #[test]
    fn test_cells_render_like_display() {
        let mut writer = CsvWriter::new(Vec::new());
        let cells = [
            Cell::Int(3),
            Cell::Float(0.25),
            Cell::Float(f64::NAN),
            Cell::Empty,
            Cell::Text("a,b".to_string()),
        ];
        writer.write_cells(cells.iter()).unwrap();
        assert_eq!(writer.rows(), 1);
        let text = String::from_utf8(writer.into_inner().unwrap()).unwrap();
        assert_eq!(text, "3,0.25,NaN,,\"a,b\"\r\n");
    }
}
