//! Rendering of a [`Report`] for the terminal, the web page and the JSON API.

use crate::enrichment::{EnrichmentRow, RejectedLine};
use crate::language::SupportedLanguage;
use crate::pipeline::{EnrichmentTable, Outcome, Report};
use crate::translation::TranslationSet;
use anyhow::{Context, Result};
use std::fmt::Write;

/// Shown in the phonetic column when no transcription is known.
pub const PHONETIC_NOT_FOUND: &str = "Not found";

const UNSUPPORTED_MESSAGE: &str = "Language not supported for translation.";

const HEADERS: [&str; 4] = ["Synonym", "Part of speech", "Phonetic", "Definition"];

fn cells(row: &EnrichmentRow) -> [&str; 4] {
    [
        row.synonym.as_str(),
        row.part_of_speech.as_deref().unwrap_or(""),
        row.phonetic.as_deref().unwrap_or(PHONETIC_NOT_FOUND),
        row.definition.as_deref().unwrap_or(""),
    ]
}

// ==================== Plain text ====================

pub fn render_text(report: &Report) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "Detected language: {}", report.language);
    if let Some(corrected) = &report.correction {
        let _ = writeln!(out, "Corrected text: {}", corrected);
    }

    out.push('\n');
    out.push_str("Translations:\n");
    if report.language == SupportedLanguage::Unsupported {
        let _ = writeln!(out, "  {}", UNSUPPORTED_MESSAGE);
    } else {
        match &report.translations {
            Outcome::Ready(set) => write_translations(&mut out, set),
            Outcome::Failed(e) => {
                let _ = writeln!(out, "  Error: {}", e);
            }
        }
    }

    for table in &report.enrichments {
        out.push('\n');
        write_text_table(&mut out, table);
    }

    out
}

fn write_translations(out: &mut String, set: &TranslationSet) {
    for translation in set.iter() {
        let _ = writeln!(out, "  {}: {}", translation.language, translation.text);
    }
}

fn skipped_notice(rejected: &[RejectedLine]) -> String {
    format!(
        "Skipped {} malformed line{} in the generated answer:",
        rejected.len(),
        if rejected.len() == 1 { "" } else { "s" }
    )
}

fn describe_rejected(line: &RejectedLine) -> String {
    format!("line {} ({}): {}", line.line_number, line.reason, line.text)
}

fn write_text_table(out: &mut String, table: &EnrichmentTable) {
    let _ = writeln!(out, "Synonyms for \"{}\" ({}):", table.word, table.language);

    let enrichment = match &table.rows {
        Outcome::Ready(enrichment) => enrichment,
        Outcome::Failed(e) => {
            let _ = writeln!(out, "  Error: {}", e);
            return;
        }
    };

    write_text_rows(out, &enrichment.rows);

    if !enrichment.rejected.is_empty() {
        let _ = writeln!(out, "  {}", skipped_notice(&enrichment.rejected));
        for line in &enrichment.rejected {
            let _ = writeln!(out, "    {}", describe_rejected(line));
        }
    }
}

fn write_text_rows(out: &mut String, rows: &[EnrichmentRow]) {
    if rows.is_empty() {
        let _ = writeln!(out, "  No synonyms found.");
        return;
    }

    let body: Vec<[&str; 4]> = rows.iter().map(cells).collect();
    let mut widths = HEADERS.map(|h| h.chars().count());
    for row in &body {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    write_text_row(out, &HEADERS, &widths);
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    let _ = writeln!(out, "  {}", rule.join("-+-"));
    for row in &body {
        write_text_row(out, row, &widths);
    }
}

fn write_text_row(out: &mut String, row: &[&str; 4], widths: &[usize; 4]) {
    let padded: Vec<String> = row
        .iter()
        .zip(widths)
        .map(|(cell, width)| {
            // pad by chars so Thai and IPA columns line up
            let fill = width.saturating_sub(cell.chars().count());
            format!("{}{}", cell, " ".repeat(fill))
        })
        .collect();
    let _ = writeln!(out, "  {}", padded.join(" | ").trim_end());
}

// ==================== HTML ====================

pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

const FORM: &str = r#"<form method="post" action="/lookup">
  <input type="text" name="text" placeholder="Enter a word or phrase" autofocus>
  <button type="submit">Look up</button>
</form>"#;

fn page(body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>Polyglot Lexicon</title>\n</head>\n<body>\n<h1>Polyglot Lexicon</h1>\n\
         {}\n{}</body>\n</html>\n",
        FORM, body
    )
}

/// The form with no result.
pub fn render_form_page() -> String {
    page("")
}

/// The form with a warning in place of a result.
pub fn render_message_page(message: &str) -> String {
    page(&format!(
        "<p class=\"warning\">{}</p>\n",
        escape_html(message)
    ))
}

pub fn render_html(report: &Report) -> String {
    let mut body = String::new();

    let _ = writeln!(
        body,
        "<p>Detected language: <strong>{}</strong></p>",
        report.language
    );
    if let Some(corrected) = &report.correction {
        let _ = writeln!(
            body,
            "<p>Corrected text: <strong>{}</strong></p>",
            escape_html(corrected)
        );
    }

    body.push_str("<h2>Translations</h2>\n");
    if report.language == SupportedLanguage::Unsupported {
        let _ = writeln!(body, "<p class=\"error\">{}</p>", UNSUPPORTED_MESSAGE);
    } else {
        match &report.translations {
            Outcome::Ready(set) => {
                body.push_str("<ul>\n");
                for translation in set.iter() {
                    let _ = writeln!(
                        body,
                        "<li>{}: {}</li>",
                        translation.language,
                        escape_html(&translation.text)
                    );
                }
                body.push_str("</ul>\n");
            }
            Outcome::Failed(e) => {
                let _ = writeln!(body, "<p class=\"error\">{}</p>", escape_html(e));
            }
        }
    }

    for table in &report.enrichments {
        write_html_table(&mut body, table);
    }

    page(&body)
}

fn write_html_table(out: &mut String, table: &EnrichmentTable) {
    let _ = writeln!(
        out,
        "<h2>Synonyms for &quot;{}&quot; ({})</h2>",
        escape_html(&table.word),
        table.language
    );

    let enrichment = match &table.rows {
        Outcome::Ready(enrichment) => enrichment,
        Outcome::Failed(e) => {
            let _ = writeln!(out, "<p class=\"error\">{}</p>", escape_html(e));
            return;
        }
    };

    write_html_rows(out, &enrichment.rows);

    if !enrichment.rejected.is_empty() {
        let _ = writeln!(
            out,
            "<p class=\"warning\">{}</p>\n<ul>",
            skipped_notice(&enrichment.rejected)
        );
        for line in &enrichment.rejected {
            let _ = writeln!(out, "<li>{}</li>", escape_html(&describe_rejected(line)));
        }
        out.push_str("</ul>\n");
    }
}

fn write_html_rows(out: &mut String, rows: &[EnrichmentRow]) {
    if rows.is_empty() {
        out.push_str("<p>No synonyms found.</p>\n");
        return;
    }

    out.push_str("<table>\n<tr>");
    for header in HEADERS {
        let _ = write!(out, "<th>{}</th>", header);
    }
    out.push_str("</tr>\n");
    for row in rows {
        out.push_str("<tr>");
        for cell in cells(row) {
            let _ = write!(out, "<td>{}</td>", escape_html(cell));
        }
        out.push_str("</tr>\n");
    }
    out.push_str("</table>\n");
}

// ==================== JSON ====================

pub fn render_json(report: &Report) -> Result<String> {
    serde_json::to_string_pretty(report).context("Failed to serialize report")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enrichment::{parse_synonym_table, Enrichment};

    fn report(
        language: SupportedLanguage,
        correction: Option<&str>,
        translations: Outcome<TranslationSet>,
        enrichments: Vec<EnrichmentTable>,
    ) -> Report {
        Report {
            input: "helo".to_string(),
            language,
            correction: correction.map(str::to_string),
            text: correction.unwrap_or("helo").to_string(),
            translations,
            enrichments,
        }
    }

    fn hello_set() -> TranslationSet {
        TranslationSet::new(
            SupportedLanguage::English,
            vec![
                (SupportedLanguage::French, "bonjour".to_string()),
                (SupportedLanguage::Thai, "สวัสดี".to_string()),
            ],
        )
    }

    fn hello_table() -> EnrichmentTable {
        EnrichmentTable {
            language: SupportedLanguage::English,
            word: "hello".to_string(),
            rows: Outcome::Ready(Enrichment::from_rows(vec![
                EnrichmentRow {
                    synonym: "hi".to_string(),
                    definition: Some("an expression of greeting".to_string()),
                    phonetic: Some("ˈhaɪ".to_string()),
                    part_of_speech: Some("noun".to_string()),
                },
                EnrichmentRow::synonym_only("hello"),
            ])),
        }
    }

    #[test]
    fn test_text_includes_every_section() {
        let text = render_text(&report(
            SupportedLanguage::English,
            Some("hello"),
            Outcome::Ready(hello_set()),
            vec![hello_table()],
        ));

        assert!(text.contains("Detected language: English"));
        assert!(text.contains("Corrected text: hello"));
        assert!(text.contains("French: bonjour"));
        assert!(text.contains("Thai: สวัสดี"));
        assert!(text.contains("Synonyms for \"hello\" (English):"));
        assert!(text.contains("an expression of greeting"));
        assert!(text.contains("ˈhaɪ"));
    }

    #[test]
    fn test_text_omits_correction_when_unchanged() {
        let text = render_text(&report(
            SupportedLanguage::English,
            None,
            Outcome::Ready(hello_set()),
            Vec::new(),
        ));
        assert!(!text.contains("Corrected text"));
    }

    #[test]
    fn test_text_marks_missing_phonetics() {
        let text = render_text(&report(
            SupportedLanguage::English,
            None,
            Outcome::Ready(hello_set()),
            vec![hello_table()],
        ));

        let padded_row = text
            .lines()
            .find(|line| line.trim_start().starts_with("hello"))
            .expect("padded row");
        assert!(padded_row.contains(PHONETIC_NOT_FOUND));
    }

    #[test]
    fn test_text_shows_inline_errors() {
        let text = render_text(&report(
            SupportedLanguage::French,
            None,
            Outcome::Failed("Translation from fr to en failed: timed out".to_string()),
            vec![EnrichmentTable {
                language: SupportedLanguage::French,
                word: "bonjour".to_string(),
                rows: Outcome::Failed("no enrichment source is available for French".to_string()),
            }],
        ));

        assert!(text.contains("Error: Translation from fr to en failed"));
        assert!(text.contains("Error: no enrichment source is available for French"));
    }

    #[test]
    fn test_text_unsupported_language() {
        let text = render_text(&report(
            SupportedLanguage::Unsupported,
            None,
            Outcome::Ready(TranslationSet::new(SupportedLanguage::Unsupported, Vec::new())),
            Vec::new(),
        ));

        assert!(text.contains("Detected language: Unsupported"));
        assert!(text.contains(UNSUPPORTED_MESSAGE));
    }

    #[test]
    fn test_text_columns_align_for_thai() {
        let table = EnrichmentTable {
            language: SupportedLanguage::Thai,
            word: "สวัสดี".to_string(),
            rows: Outcome::Ready(Enrichment::from_rows(vec![
                EnrichmentRow::with_definition("หวัดดี", "คำทักทาย"),
                EnrichmentRow::with_definition("ดี", "ทักทาย"),
            ])),
        };
        let mut out = String::new();
        write_text_table(&mut out, &table);

        let separators: Vec<usize> = out
            .lines()
            .filter(|line| line.contains(" | "))
            .map(|line| line.chars().take_while(|c| *c != '|').count())
            .collect();
        assert_eq!(separators.len(), 3);
        assert!(separators.windows(2).all(|w| w[0] == w[1]));
    }

    fn sloppy_french_table() -> EnrichmentTable {
        EnrichmentTable {
            language: SupportedLanguage::French,
            word: "bonjour".to_string(),
            rows: Outcome::Ready(parse_synonym_table(
                "salut: formule familière\n<b>coucou</b>",
            )),
        }
    }

    #[test]
    fn test_text_flags_rejected_lines() {
        let text = render_text(&report(
            SupportedLanguage::French,
            None,
            Outcome::Ready(hello_set()),
            vec![sloppy_french_table()],
        ));

        assert!(text.contains("salut"));
        assert!(text.contains("Skipped 1 malformed line in the generated answer:"));
        assert!(text.contains("line 2 (no ':' separator): <b>coucou</b>"));
    }

    #[test]
    fn test_text_without_rejections_has_no_notice() {
        let text = render_text(&report(
            SupportedLanguage::English,
            None,
            Outcome::Ready(hello_set()),
            vec![hello_table()],
        ));
        assert!(!text.contains("Skipped"));
    }

    #[test]
    fn test_html_flags_rejected_lines_escaped() {
        let html = render_html(&report(
            SupportedLanguage::French,
            None,
            Outcome::Ready(hello_set()),
            vec![sloppy_french_table()],
        ));

        assert!(html.contains("<td>salut</td>"));
        assert!(html.contains("Skipped 1 malformed line in the generated answer:"));
        assert!(html.contains("<li>line 2 (no &#39;:&#39; separator): &lt;b&gt;coucou&lt;/b&gt;</li>"));
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html("<b>\"Tom\" & 'Jerry'</b>"),
            "&lt;b&gt;&quot;Tom&quot; &amp; &#39;Jerry&#39;&lt;/b&gt;"
        );
    }

    #[test]
    fn test_html_escapes_user_text() {
        let html = render_html(&report(
            SupportedLanguage::English,
            Some("<script>"),
            Outcome::Ready(hello_set()),
            vec![hello_table()],
        ));

        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("<script>"));
        assert!(html.contains("<td>hi</td>"));
        assert!(html.contains("<li>French: bonjour</li>"));
    }

    #[test]
    fn test_message_page_contains_form_and_warning() {
        let html = render_message_page("Please enter a valid word or phrase to process.");
        assert!(html.contains("action=\"/lookup\""));
        assert!(html.contains("Please enter a valid word or phrase to process."));
    }

    #[test]
    fn test_json_round_trips_key_fields() {
        let json = render_json(&report(
            SupportedLanguage::English,
            Some("hello"),
            Outcome::Ready(hello_set()),
            vec![hello_table()],
        ))
        .expect("Should serialize");

        let value: serde_json::Value = serde_json::from_str(&json).expect("valid JSON");
        assert_eq!(value["correction"], "hello");
        assert_eq!(
            value["enrichments"][0]["rows"]["ready"]["rows"][0]["synonym"],
            "hi"
        );
        assert!(value["enrichments"][0]["rows"]["ready"]["rejected"]
            .as_array()
            .is_some_and(|lines| lines.is_empty()));
    }
}
