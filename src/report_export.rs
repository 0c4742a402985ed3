use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use printpdf::{BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference, PdfLayerReference};

use crate::aggregate::{Dataset, GroupAverages, PlayerMeans, PlayerTotal, Selection, SessionInfo};
use crate::labels::Language;
use crate::metrics::{ALL_METRICS, MetricKey};

const PAGE_W: f32 = 210.0;
const PAGE_H: f32 = 297.0;
const MARGIN: f32 = 15.0;
const PT_TO_MM: f32 = 0.3528;

#[derive(Debug, Clone, PartialEq)]
pub struct ReportSummary {
    pub match_label: String,
    pub date_label: String,
    pub player_label: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MetricTotals {
    pub metric: MetricKey,
    pub totals: Vec<PlayerTotal>,
}

/// Owned snapshot of one selection, so exports can run off the UI thread.
#[derive(Debug, Clone)]
pub struct ExportJob {
    pub language: Language,
    pub summary: ReportSummary,
    pub groups: Vec<GroupAverages>,
    pub means: Vec<PlayerMeans>,
    pub totals: Vec<MetricTotals>,
    pub sessions: Vec<SessionInfo>,
}

impl ExportJob {
    /// `None` when the selection matches no rows.
    pub fn build(dataset: &Dataset, selection: &Selection, language: Language) -> Option<Self> {
        let labels = language.labels();
        let report = dataset.report(selection);
        if report.is_empty() {
            return None;
        }
        let summary = ReportSummary {
            match_label: selection
                .match_key
                .as_ref()
                .map(|key| key.display(labels))
                .unwrap_or_else(|| labels.all.to_string()),
            date_label: report.date.label(labels),
            player_label: selection
                .player
                .clone()
                .unwrap_or_else(|| labels.all.to_string()),
        };
        let totals = ALL_METRICS
            .iter()
            .copied()
            .filter(|m| report.columns.contains(m))
            .map(|metric| MetricTotals {
                metric,
                totals: report.totals(metric),
            })
            .collect();
        Some(Self {
            language,
            summary,
            groups: report.groups.clone(),
            means: report.means.clone(),
            totals,
            sessions: dataset.sessions.clone(),
        })
    }

    pub fn summary_lines(&self) -> Vec<String> {
        let labels = self.language.labels();
        vec![
            format!("{}: {}", labels.match_label, self.summary.match_label),
            format!("{}: {}", labels.date, self.summary.date_label),
            format!("{}: {}", labels.player, self.summary.player_label),
        ]
    }
}

/// Folds text to what the built-in (WinAnsi) PDF fonts can show.
pub fn latin1_safe(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            'á' | 'à' | 'â' | 'ä' => 'a',
            'Á' | 'À' | 'Â' | 'Ä' => 'A',
            'é' | 'è' | 'ê' | 'ë' => 'e',
            'É' | 'È' | 'Ê' | 'Ë' => 'E',
            'í' | 'ì' | 'î' | 'ï' => 'i',
            'Í' | 'Ì' | 'Î' | 'Ï' => 'I',
            'ó' | 'ò' | 'ô' | 'ö' => 'o',
            'Ó' | 'Ò' | 'Ô' | 'Ö' => 'O',
            'ú' | 'ù' | 'û' | 'ü' => 'u',
            'Ú' | 'Ù' | 'Û' | 'Ü' => 'U',
            'ñ' => 'n',
            'Ñ' => 'N',
            'ç' => 'c',
            'Ç' => 'C',
            '°' | 'º' => 'o',
            c if c.is_ascii() => c,
            _ => '?',
        })
        .collect()
}

struct PdfWriter {
    doc: PdfDocumentReference,
    layer: PdfLayerReference,
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    y: f32,
    pages: usize,
}

impl PdfWriter {
    fn new(title: &str) -> Result<Self> {
        let (doc, page, layer) = PdfDocument::new(title, Mm(PAGE_W), Mm(PAGE_H), "Layer 1");
        let regular = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|err| anyhow!("load pdf font: {err:?}"))?;
        let bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|err| anyhow!("load pdf font: {err:?}"))?;
        let layer = doc.get_page(page).get_layer(layer);
        Ok(Self {
            doc,
            layer,
            regular,
            bold,
            y: PAGE_H - MARGIN,
            pages: 1,
        })
    }

    fn ensure_room(&mut self, height: f32) {
        if self.y - height >= MARGIN {
            return;
        }
        self.pages += 1;
        let (page, layer) =
            self.doc
                .add_page(Mm(PAGE_W), Mm(PAGE_H), format!("Layer {}", self.pages));
        self.layer = self.doc.get_page(page).get_layer(layer);
        self.y = PAGE_H - MARGIN;
    }

    fn line(&mut self, text: &str, size: f32, bold: bool, height: f32) {
        self.ensure_room(height);
        self.y -= height;
        let font = if bold { &self.bold } else { &self.regular };
        self.layer
            .use_text(latin1_safe(text), size, Mm(MARGIN), Mm(self.y), font);
    }

    fn centered(&mut self, text: &str, size: f32, height: f32) {
        self.ensure_room(height);
        self.y -= height;
        let text = latin1_safe(text);
        // Helvetica averages roughly half an em per glyph.
        let width = text.chars().count() as f32 * size * 0.5 * PT_TO_MM;
        let x = ((PAGE_W - width) / 2.0).max(MARGIN);
        self.layer.use_text(text, size, Mm(x), Mm(self.y), &self.bold);
    }

    fn gap(&mut self, height: f32) {
        self.y -= height;
    }

    fn finish(self) -> Result<Vec<u8>> {
        self.doc
            .save_to_bytes()
            .map_err(|err| anyhow!("render pdf: {err:?}"))
    }
}

/// Title, summary lines, per-group averages and, optionally, per-metric
/// player totals.
pub fn build_pdf(job: &ExportJob, include_totals: bool) -> Result<Vec<u8>> {
    let labels = job.language.labels();
    let mut pdf = PdfWriter::new(labels.pdf_title)?;

    pdf.centered(labels.pdf_title, 14.0, 10.0);
    pdf.gap(10.0);
    for line in job.summary_lines() {
        pdf.line(&line, 12.0, false, 10.0);
    }
    pdf.gap(5.0);

    for group in &job.groups {
        pdf.line(
            &format!("{} {}", labels.avg_of, group.group.label(job.language)),
            12.0,
            true,
            10.0,
        );
        for (metric, value) in &group.items {
            pdf.line(
                &format!("{}: {value:.1}", metric.label(job.language)),
                11.0,
                false,
                8.0,
            );
        }
        pdf.gap(3.0);
    }

    if include_totals {
        for entry in &job.totals {
            pdf.line(
                &format!("{} {}", labels.totals_of, entry.metric.label(job.language)),
                12.0,
                true,
                10.0,
            );
            // Charts list highest first.
            for total in entry.totals.iter().rev() {
                pdf.line(
                    &format!("{}: {:.1}", total.player, total.total),
                    10.0,
                    false,
                    6.0,
                );
            }
            pdf.gap(3.0);
        }
    }

    pdf.finish()
}

pub fn write_pdf(job: &ExportJob, path: &Path, include_totals: bool) -> Result<PathBuf> {
    let bytes = build_pdf(job, include_totals)?;
    if let Some(dir) = path.parent()
        && !dir.as_os_str().is_empty()
    {
        fs::create_dir_all(dir).with_context(|| format!("create {}", dir.display()))?;
    }
    fs::write(path, bytes).with_context(|| format!("failed writing pdf to {}", path.display()))?;
    tracing::info!(path = %path.display(), "pdf report written");
    Ok(path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn latin1_safe_folds_spanish_accents() {
        assert_eq!(latin1_safe("Aceleración"), "Aceleracion");
        assert_eq!(latin1_safe("N° de Sprints"), "No de Sprints");
        assert_eq!(latin1_safe("Señal ✓"), "Senal ?");
    }
}
