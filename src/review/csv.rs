//! CSV export of filtered record lists.
//!
//! The column sets are fixed; rows arrive already filtered and ordered. The
//! writer quotes per RFC 4180 (double quotes, doubled inside quoted fields)
//! so free-text subjects with commas or newlines survive a spreadsheet
//! import.

use crate::types::{ClientProfile, Inquiry};

const INQUIRY_HEADER: &str = "id,name,email,company,type,status,subject,created_at";
const PROFILE_HEADER: &str = "id,name,email,firm,status,created_at";

pub fn inquiries_to_csv(rows: &[Inquiry]) -> String {
  let mut out = String::with_capacity(64 + rows.len() * 96);
  out.push_str(INQUIRY_HEADER);
  out.push_str("\r\n");
  for row in rows {
    push_record(
      &mut out,
      &[
        &row.id.to_string(),
        &row.name,
        &row.email,
        row.company.as_deref().unwrap_or(""),
        &row.inquiry_type,
        row.status.as_str(),
        row.subject.as_deref().unwrap_or(""),
        &row.created_at.to_rfc3339(),
      ],
    );
  }
  out
}

pub fn profiles_to_csv(rows: &[ClientProfile]) -> String {
  let mut out = String::with_capacity(64 + rows.len() * 80);
  out.push_str(PROFILE_HEADER);
  out.push_str("\r\n");
  for row in rows {
    push_record(
      &mut out,
      &[
        &row.id.to_string(),
        &row.name,
        &row.email,
        row.firm.as_deref().unwrap_or(""),
        row.status.as_str(),
        &row.created_at.to_rfc3339(),
      ],
    );
  }
  out
}

fn push_record(out: &mut String, fields: &[&str]) {
  for (i, field) in fields.iter().enumerate() {
    if i > 0 {
      out.push(',');
    }
    push_field(out, field);
  }
  out.push_str("\r\n");
}

fn push_field(out: &mut String, field: &str) {
  if field.contains([',', '"', '\n', '\r']) {
    out.push('"');
    for c in field.chars() {
      if c == '"' {
        out.push('"');
      }
      out.push(c);
    }
    out.push('"');
  } else {
    out.push_str(field);
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::types::RecordStatus;
  use chrono::Utc;
  use serde_json::json;
  use uuid::Uuid;

  #[test]
  fn quotes_fields_with_commas_and_quotes() {
    let row = Inquiry {
      id: Uuid::nil(),
      name: "Lee, Jordan".to_string(),
      email: "lee@x.example".to_string(),
      company: None,
      inquiry_type: "general".to_string(),
      subject: Some("Re: \"term sheet\"".to_string()),
      message: String::new(),
      status: RecordStatus::default(),
      metadata: json!({}),
      created_at: Utc::now(),
      updated_at: Utc::now(),
    };
    let csv = inquiries_to_csv(&[row]);
    let mut lines = csv.split("\r\n");
    assert_eq!(
      lines.next().unwrap(),
      "id,name,email,company,type,status,subject,created_at"
    );
    let line = lines.next().unwrap();
    assert!(line.contains("\"Lee, Jordan\""));
    assert!(line.contains("\"Re: \"\"term sheet\"\"\""));
  }

  #[test]
  fn header_only_when_empty() {
    let csv = profiles_to_csv(&[]);
    assert_eq!(csv, "id,name,email,firm,status,created_at\r\n");
  }
}
