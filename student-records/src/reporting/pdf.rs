//! HTML to PDF rasterization
//!
//! Rendering is a synchronous, fallible seam. Two engines are provided:
//! - [`BuiltinPdfRenderer`]: lays out the report text on A4 pages using a
//!   standard Type1 font, with no external programs
//! - [`CommandPdfRenderer`]: pipes the HTML through an external converter
//!   (for example `wkhtmltopdf - -`) and returns whatever PDF it prints

use crate::error::{AppError, Result};
use crate::services::settings::{PdfEngine, PdfSettings};
use std::io::Write;
use std::process::{Command, Stdio};
use std::sync::Arc;

/// Converts report HTML into PDF bytes
pub trait PdfRenderer: Send + Sync {
    fn render(&self, html: &str) -> Result<Vec<u8>>;
}

/// Build the renderer selected in settings
pub fn renderer_from_settings(settings: &PdfSettings) -> Result<Arc<dyn PdfRenderer>> {
    match settings.engine {
        PdfEngine::Builtin => Ok(Arc::new(BuiltinPdfRenderer::default())),
        PdfEngine::Command => {
            let program = settings
                .command
                .as_deref()
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .ok_or_else(|| {
                    AppError::Generic("pdf.command must be set when pdf.engine is \"command\"".to_string())
                })?;
            Ok(Arc::new(CommandPdfRenderer::new(program, settings.args.clone())))
        }
    }
}

// ===== Built-in engine =====

const PAGE_WIDTH: u32 = 595;
const PAGE_HEIGHT: u32 = 842;
const MARGIN: u32 = 50;
const FONT_SIZE: u32 = 9;
const LEADING: u32 = 12;
const MAX_LINE_CHARS: usize = 100;

/// Plain text layout of the report on A4 pages
#[derive(Debug, Clone, Default)]
pub struct BuiltinPdfRenderer;

impl PdfRenderer for BuiltinPdfRenderer {
    fn render(&self, html: &str) -> Result<Vec<u8>> {
        let text = extract_text(html);
        if text.lines.iter().all(|l| l.trim().is_empty()) {
            return Err(AppError::Rendering(
                "PDF generation error: document has no content".to_string(),
            ));
        }

        let lines: Vec<String> = text.lines.iter().flat_map(|l| wrap_line(l)).collect();
        Ok(write_pdf(text.title.as_deref(), &lines))
    }
}

/// Text content of an HTML document, one entry per visual line
#[derive(Debug, Default, PartialEq)]
struct ExtractedText {
    title: Option<String>,
    lines: Vec<String>,
}

fn extract_text(html: &str) -> ExtractedText {
    let mut out = ExtractedText::default();
    let mut text = String::new();
    let mut cells: Vec<String> = Vec::new();
    let mut skip_depth = 0usize;
    let mut in_title = false;
    let mut title = String::new();

    let mut chars = html.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '<' {
            if in_title {
                title.push(c);
            } else if skip_depth == 0 {
                text.push(c);
            }
            continue;
        }

        let mut tag = String::new();
        for t in chars.by_ref() {
            if t == '>' {
                break;
            }
            tag.push(t);
        }

        let tag = tag.trim().to_ascii_lowercase();
        let closing = tag.starts_with('/');
        let name: String = tag
            .trim_start_matches('/')
            .chars()
            .take_while(|c| c.is_ascii_alphanumeric())
            .collect();

        match (name.as_str(), closing) {
            ("style" | "script", false) => skip_depth += 1,
            ("style" | "script", true) => skip_depth = skip_depth.saturating_sub(1),
            ("title", false) => in_title = true,
            ("title", true) => in_title = false,
            ("td" | "th", true) => cells.push(collapse(&std::mem::take(&mut text))),
            ("tr", true) => {
                out.lines.push(cells.join(" | "));
                cells.clear();
                text.clear();
            }
            ("div" | "h1" | "h2" | "p", true) | ("br", _) => {
                let line = collapse(&std::mem::take(&mut text));
                if !line.is_empty() {
                    out.lines.push(line);
                }
            }
            ("table", true) => out.lines.push(String::new()),
            _ => {}
        }
    }

    let tail = collapse(&text);
    if !tail.is_empty() {
        out.lines.push(tail);
    }

    let title = collapse(&title);
    out.title = Some(title).filter(|t| !t.is_empty());
    out
}

/// Collapse whitespace and decode the entities produced by `html_escape`
fn collapse(raw: &str) -> String {
    raw.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
}

fn wrap_line(line: &str) -> Vec<String> {
    let chars: Vec<char> = line.chars().collect();
    if chars.len() <= MAX_LINE_CHARS {
        return vec![line.to_string()];
    }
    chars
        .chunks(MAX_LINE_CHARS)
        .map(|chunk| chunk.iter().collect())
        .collect()
}

/// Escape text as a PDF literal string in WinAnsi encoding
fn pdf_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('(');
    for c in s.chars() {
        match c {
            '(' | ')' | '\\' => {
                out.push('\\');
                out.push(c);
            }
            ' '..='~' => out.push(c),
            '\u{a0}'..='\u{ff}' => out.push_str(&format!("\\{:03o}", c as u32)),
            c if c.is_control() => {}
            _ => out.push('?'),
        }
    }
    out.push(')');
    out
}

fn write_pdf(title: Option<&str>, lines: &[String]) -> Vec<u8> {
    let lines_per_page = ((PAGE_HEIGHT - 2 * MARGIN) / LEADING) as usize;
    let pages: Vec<&[String]> = lines.chunks(lines_per_page).collect();
    let page_count = pages.len().max(1);

    let mut objects: Vec<String> = Vec::new();
    objects.push("<< /Type /Catalog /Pages 2 0 R >>".to_string());

    let kids: Vec<String> = (0..page_count).map(|i| format!("{} 0 R", 4 + 2 * i)).collect();
    objects.push(format!(
        "<< /Type /Pages /Kids [{}] /Count {} >>",
        kids.join(" "),
        page_count
    ));
    objects.push(
        "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >>"
            .to_string(),
    );

    for i in 0..page_count {
        let page_lines = pages.get(i).copied().unwrap_or(&[]);

        let mut content = format!(
            "BT\n/F1 {} Tf\n{} TL\n{} {} Td\n",
            FONT_SIZE,
            LEADING,
            MARGIN,
            PAGE_HEIGHT - MARGIN
        );
        for line in page_lines {
            content.push_str(&pdf_string(line));
            content.push_str(" Tj T*\n");
        }
        content.push_str("ET");

        objects.push(format!(
            "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {} {}] /Resources << /Font << /F1 3 0 R >> >> /Contents {} 0 R >>",
            PAGE_WIDTH,
            PAGE_HEIGHT,
            5 + 2 * i
        ));
        objects.push(format!(
            "<< /Length {} >>\nstream\n{}\nendstream",
            content.len(),
            content
        ));
    }

    let info_id = objects.len() + 1;
    objects.push(format!(
        "<< /Title {} /Producer (student-records) >>",
        pdf_string(title.unwrap_or("Report"))
    ));

    let mut pdf = String::from("%PDF-1.4\n");
    let mut offsets = Vec::with_capacity(objects.len());
    for (i, body) in objects.iter().enumerate() {
        offsets.push(pdf.len());
        pdf.push_str(&format!("{} 0 obj\n{}\nendobj\n", i + 1, body));
    }

    let xref_offset = pdf.len();
    pdf.push_str(&format!("xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1));
    for offset in offsets {
        pdf.push_str(&format!("{:010} 00000 n \n", offset));
    }
    pdf.push_str(&format!(
        "trailer\n<< /Size {} /Root 1 0 R /Info {} 0 R >>\nstartxref\n{}\n%%EOF\n",
        objects.len() + 1,
        info_id,
        xref_offset
    ));

    pdf.into_bytes()
}

// ===== External command engine =====

/// Runs an external HTML to PDF converter reading stdin and writing stdout
#[derive(Debug, Clone)]
pub struct CommandPdfRenderer {
    program: String,
    args: Vec<String>,
}

impl CommandPdfRenderer {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }
}

impl PdfRenderer for CommandPdfRenderer {
    fn render(&self, html: &str) -> Result<Vec<u8>> {
        tracing::debug!("Rendering PDF with {} {:?}", self.program, self.args);

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| AppError::Rendering(format!("failed to start {}: {}", self.program, e)))?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| AppError::Rendering("renderer stdin unavailable".to_string()))?;

        // Feed stdin from a separate thread so a converter that streams
        // output before consuming all input cannot deadlock us
        let input = html.as_bytes().to_vec();
        let writer = std::thread::spawn(move || stdin.write_all(&input));

        let output = child.wait_with_output()?;

        match writer.join() {
            Ok(Ok(())) => {}
            Ok(Err(e)) if e.kind() == std::io::ErrorKind::BrokenPipe => {}
            Ok(Err(e)) => return Err(AppError::Io(e)),
            Err(_) => {
                return Err(AppError::Rendering("renderer input thread panicked".to_string()))
            }
        }

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(AppError::Rendering(format!(
                "PDF generation error: {} exited with {}: {}",
                self.program,
                output.status,
                stderr.trim()
            )));
        }

        if !output.stdout.starts_with(b"%PDF") {
            return Err(AppError::Rendering(format!(
                "PDF generation error: {} produced no PDF output",
                self.program
            )));
        }

        Ok(output.stdout)
    }
}
