//! Multipart form handling and upload-to-text helpers.

use std::path::Path;

use axum::body::Bytes;
use axum::extract::Multipart;

use crate::error::{ApiError, ApiResult};

/// One multipart field, fully buffered.
#[derive(Debug, Clone)]
pub struct Upload {
    pub name: String,
    pub file_name: Option<String>,
    pub data: Bytes,
}

impl Upload {
    /// Lower-cased extension of the client-side file name, if any.
    pub fn extension(&self) -> Option<String> {
        self.file_name
            .as_deref()
            .and_then(|n| Path::new(n).extension())
            .map(|e| e.to_string_lossy().to_ascii_lowercase())
    }
}

/// All fields of a multipart request, in arrival order.
#[derive(Debug, Default)]
pub struct Form {
    fields: Vec<Upload>,
}

impl Form {
    pub async fn read(mut multipart: Multipart) -> ApiResult<Self> {
        let mut fields = Vec::new();
        while let Some(field) = multipart.next_field().await? {
            let name = field.name().unwrap_or_default().to_string();
            let file_name = field.file_name().map(str::to_string);
            let data = field.bytes().await?;
            fields.push(Upload {
                name,
                file_name,
                data,
            });
        }
        Ok(Self { fields })
    }

    /// Remove and return the first field called `name`.
    pub fn take(&mut self, name: &str) -> ApiResult<Upload> {
        let idx = self
            .fields
            .iter()
            .position(|f| f.name == name)
            .ok_or_else(|| ApiError::BadRequest(format!("missing multipart field '{name}'")))?;
        Ok(self.fields.remove(idx))
    }

    /// Like [`take`](Self::take), rejecting an empty upload.
    pub fn take_nonempty(&mut self, name: &str) -> ApiResult<Upload> {
        let upload = self.take(name)?;
        if upload.data.is_empty() {
            return Err(ApiError::BadRequest(format!(
                "multipart field '{name}' is empty"
            )));
        }
        Ok(upload)
    }

    /// Text values of every field called `name`.
    pub fn values<'a>(&'a self, name: &'a str) -> impl Iterator<Item = String> + 'a {
        self.fields
            .iter()
            .filter(move |f| f.name == name)
            .map(|f| String::from_utf8_lossy(&f.data).into_owned())
    }

    pub fn value(&self, name: &str) -> Option<String> {
        self.values(name).next()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.iter().any(|f| f.name == name)
    }
}

/// Candidate labels from one or more form values. Each value is either a
/// JSON array of strings or comma-separated text; a value that only looks
/// like JSON (`[草稿],其他`) is split on commas. Blanks and duplicates are
/// dropped, first occurrence wins.
pub fn parse_labels<I>(values: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut labels: Vec<String> = Vec::new();
    for value in values {
        let value = value.trim();
        let parsed = value
            .starts_with('[')
            .then(|| serde_json::from_str::<Vec<String>>(value).ok())
            .flatten()
            .unwrap_or_else(|| split_labels(value));
        for label in parsed {
            let label = label.trim();
            if !label.is_empty() && !labels.iter().any(|l| l == label) {
                labels.push(label.to_string());
            }
        }
    }
    labels
}

fn split_labels(value: &str) -> Vec<String> {
    value.split([',', '，']).map(str::to_string).collect()
}

/// Optional non-negative integer form value.
pub fn parse_num_results(value: Option<String>) -> ApiResult<Option<usize>> {
    match value.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(v) => v
            .parse()
            .map(Some)
            .map_err(|_| ApiError::BadRequest(format!("invalid num_results '{v}'"))),
    }
}

/// Text the classifier sees for a CSV upload: the file name stem followed
/// by the header row. Row data is never read. A UTF-8 BOM is skipped and
/// invalid UTF-8 replaced.
pub fn csv_header_text(file_name: Option<&str>, data: &[u8]) -> String {
    let data = data.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(data);

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(data);
    let mut record = csv::ByteRecord::new();
    let headers: Vec<String> = match reader.read_byte_record(&mut record) {
        Ok(true) => record
            .iter()
            .map(|h| String::from_utf8_lossy(h).trim().to_string())
            .filter(|h| !h.is_empty())
            .collect(),
        _ => Vec::new(),
    };

    let stem = file_name
        .and_then(|n| Path::new(n).file_stem())
        .map(|s| s.to_string_lossy().trim().to_string())
        .filter(|s| !s.is_empty());

    match stem {
        Some(stem) if headers.is_empty() => stem,
        Some(stem) => format!("{stem}: {}", headers.join(", ")),
        None => headers.join(", "),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_from_json_and_commas() {
        let labels = parse_labels([
            r#"["城市景观", "自然风光"]"#.to_string(),
            "人物, 城市景观，动物".to_string(),
        ]);
        assert_eq!(labels, ["城市景观", "自然风光", "人物", "动物"]);
    }

    #[test]
    fn labels_blank_values_ignored() {
        assert!(parse_labels([" , ".to_string(), String::new()]).is_empty());
    }

    #[test]
    fn labels_bracketed_text_split_on_commas() {
        assert_eq!(parse_labels(["[草稿],其他".to_string()]), ["[草稿]", "其他"]);
        assert_eq!(parse_labels(["[1, 2".to_string()]), ["[1", "2"]);
        assert_eq!(parse_labels([r#"["a", 1]"#.to_string()]), [r#"["a""#, "1]"]);
    }

    #[test]
    fn num_results_parsing() {
        assert_eq!(parse_num_results(None).unwrap(), None);
        assert_eq!(parse_num_results(Some(" ".into())).unwrap(), None);
        assert_eq!(parse_num_results(Some("3".into())).unwrap(), Some(3));
        assert!(parse_num_results(Some("-1".into())).is_err());
        assert!(parse_num_results(Some("three".into())).is_err());
    }

    #[test]
    fn csv_headers_with_bom_and_stem() {
        let data = "\u{feff}姓名,手机号,身份证号\n张三,13800000000,110101199001011234\n";
        assert_eq!(
            csv_header_text(Some("个人基本信息_1.csv"), data.as_bytes()),
            "个人基本信息_1: 姓名, 手机号, 身份证号"
        );
    }

    #[test]
    fn csv_rows_do_not_matter() {
        let a = "a,b\n1,2\n";
        let b = "a,b\nx,y\nz,w\n";
        assert_eq!(
            csv_header_text(Some("f.csv"), a.as_bytes()),
            csv_header_text(Some("f.csv"), b.as_bytes())
        );
    }

    #[test]
    fn csv_quoted_and_invalid_utf8_headers() {
        let mut data = b"\"last, first\",".to_vec();
        data.extend_from_slice(&[0xff, 0xfe]);
        data.extend_from_slice(b"\r\n1,2\r\n");
        let text = csv_header_text(None, &data);
        assert!(text.starts_with("last, first, "));
        assert!(text.contains('\u{fffd}'));
    }

    #[test]
    fn csv_empty_file() {
        assert_eq!(csv_header_text(None, b""), "");
        assert_eq!(csv_header_text(Some("data.csv"), b""), "data");
    }

    #[test]
    fn upload_extension_lowercased() {
        let upload = Upload {
            name: "audio".into(),
            file_name: Some("Voice.WAV".into()),
            data: Bytes::from_static(b"x"),
        };
        assert_eq!(upload.extension().as_deref(), Some("wav"));
    }
}
