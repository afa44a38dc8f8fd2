// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Report generation (JSON and HTML)

use super::runner::{JudgedCase, Report};
use chrono::Utc;
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

/// Output format of a report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    #[default]
    Json,
    Html,
}

impl ReportFormat {
    /// Name of the report file written for this format
    pub fn file_name(&self) -> &'static str {
        match self {
            ReportFormat::Json => "relatorio.json",
            ReportFormat::Html => "relatorio.html",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ReportFormat::Json => "json",
            ReportFormat::Html => "html",
        }
    }
}

impl fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReportFormat {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(ReportFormat::Json),
            "html" => Ok(ReportFormat::Html),
            _ => Err(ReportError::UnknownFormat(s.to_string())),
        }
    }
}

/// Errors while producing a report
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("unknown report format `{0}` (expected json or html)")]
    UnknownFormat(String),

    #[error("failed to serialize report: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("failed to write report to {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonReport<'a> {
    testes_totais: usize,
    testes_falhos: usize,
    tempo_total: f64,
    tempo_medio: f64,
    memoria_consumida: i64,
    testes: Vec<JsonCase<'a>>,
}

#[derive(Serialize)]
struct JsonCase<'a> {
    expressao: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    variaveis: Option<JsonBindings<'a>>,
    esperado: Number,
    obtido: Option<Number>,
    sucesso: bool,
}

/// JSON has no literal for infinities or NaN, and serde_json would write
/// them as `null`, which is reserved for a failed evaluation. Non-finite
/// values are written as the strings `Infinity`, `-Infinity` and `NaN`.
struct Number(f64);

impl Serialize for Number {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match non_finite_label(self.0) {
            Some(label) => serializer.serialize_str(label),
            None => serializer.serialize_f64(self.0),
        }
    }
}

fn non_finite_label(value: f64) -> Option<&'static str> {
    if value.is_nan() {
        Some("NaN")
    } else if value == f64::INFINITY {
        Some("Infinity")
    } else if value == f64::NEG_INFINITY {
        Some("-Infinity")
    } else {
        None
    }
}

/// Table cell text for a number, labelled the same way as in JSON
fn format_number(value: f64) -> String {
    match non_finite_label(value) {
        Some(label) => label.to_string(),
        None => format!("{:.4}", value),
    }
}

/// Bindings as a list of single-entry objects, in source order
struct JsonBindings<'a>(&'a JudgedCase);

impl Serialize for JsonBindings<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        struct Entry<'b>(&'b str, f64);

        impl Serialize for Entry<'_> {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry(self.0, &Number(self.1))?;
                map.end()
            }
        }

        let bindings = self.0.case().bindings();
        let mut seq = serializer.serialize_seq(Some(bindings.len()))?;
        for binding in bindings {
            seq.serialize_element(&Entry(&binding.name, binding.value))?;
        }
        seq.end()
    }
}

impl<'a> JsonReport<'a> {
    fn from_report(report: &'a Report) -> Self {
        let metrics = report.metrics();
        Self {
            testes_totais: report.total(),
            testes_falhos: report.failed(),
            tempo_total: metrics.elapsed_total_ms(),
            tempo_medio: metrics.elapsed_average_ms(),
            memoria_consumida: metrics.memory_delta().unwrap_or(0),
            testes: report
                .cases()
                .iter()
                .map(|judged| JsonCase {
                    expressao: judged.case().expression(),
                    variaveis: judged.case().has_bindings().then_some(JsonBindings(judged)),
                    esperado: Number(judged.case().expected()),
                    obtido: judged.obtained().map(Number),
                    sucesso: judged.success(),
                })
                .collect(),
        }
    }
}

/// Report writer
pub struct Reporter;

impl Reporter {
    /// Render the report as a JSON document
    pub fn to_json(report: &Report) -> Result<String, ReportError> {
        Ok(serde_json::to_string_pretty(&JsonReport::from_report(report))?)
    }

    /// Render the report as an HTML document
    pub fn to_html(report: &Report) -> String {
        let metrics = report.metrics();
        let mut html = String::new();

        html.push_str("<!DOCTYPE html>\n");
        html.push_str("<html>\n\n");
        html.push_str("<head>\n");
        html.push_str("<meta charset=\"UTF-8\">\n");
        html.push_str("<title>Relatório de Testes</title>\n");
        html.push_str("<style>th, td {padding: 5px; border-bottom: 1px solid #ddd;}</style>\n");
        html.push_str("</head>\n\n");
        html.push_str("<body>\n");
        html.push_str("<h1>Relatório de testes do avaliador de expressões</h1>\n\n");

        // Summary
        html.push_str("<h2>Informações gerais</h2>\n");
        html.push_str(&format!(
            "<p><b>Testes executados:</b> {} testes.\n",
            report.total()
        ));
        html.push_str(&format!(
            "<br><b>Testes que falharam:</b> {} testes ({:.0}%).\n",
            report.failed(),
            report.failure_rate()
        ));
        html.push_str(&format!(
            "<br><b>Tempo total:</b> {:.0} milissegundos.\n",
            metrics.elapsed_total_ms()
        ));
        html.push_str(&format!(
            "<br><b>Tempo médio:</b> {:.3} milissegundos por teste.\n",
            metrics.elapsed_average_ms()
        ));
        html.push_str(&format!(
            "<br><b>Memória consumida:</b> {:.2} bytes.\n",
            metrics.memory_delta().unwrap_or(0) as f64
        ));
        html.push_str(
            "<br><small>Note que para arquivos de teste pequenos, a memória consumida \
             pode não ser precisamente detectada.</small>\n",
        );
        html.push_str("</p>\n\n");

        // Table
        html.push_str("<h2>Testes detalhados</h2>\n");
        html.push_str("<table>\n");
        html.push_str("<tr>\n");
        for header in ["Expressão", "Variáveis", "Esperado", "Obtido", "Sucesso"] {
            html.push_str(&format!("<th><b>{}</b></th>\n", header));
        }
        html.push_str("</tr>\n");

        for judged in report.cases() {
            let case = judged.case();
            let obtained = match judged.obtained() {
                Some(value) => format_number(value),
                None => "—".to_string(),
            };

            html.push_str("<tr>\n");
            html.push_str(&format!("<td>{}</td>\n", escape_html(case.expression())));
            html.push_str(&format!("<td>{}</td>\n", escape_html(case.variables())));
            html.push_str(&format!("<td>{}</td>\n", format_number(case.expected())));
            match judged.error() {
                Some(err) => html.push_str(&format!(
                    "<td title=\"{}\">{}</td>\n",
                    escape_html(err),
                    obtained
                )),
                None => html.push_str(&format!("<td>{}</td>\n", obtained)),
            }
            if judged.success() {
                html.push_str("<td><span style=\"color:#00FF00\">SIM</span></td>\n");
            } else {
                html.push_str("<td><span style=\"color:#FF0000\">NÃO</span></td>\n");
            }
            html.push_str("</tr>\n");
        }
        html.push_str("</table>\n\n");

        // Banner
        if report.all_passed() {
            html.push_str(
                "<b><span style=\"color:#00FF00\">Todos os testes passaram.</span></b>\n",
            );
        } else {
            html.push_str(
                "<b><span style=\"color:#FF0000\">Os testes não foram executados \
                 com sucesso.</span></b>\n",
            );
        }

        // Footer
        html.push_str(&format!(
            "\n<p><small>Gerado em {}</small></p>\n",
            Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
        ));
        html.push_str("</body>\n\n");
        html.push_str("</html>\n");

        html
    }

    /// Render in the given format
    pub fn render(report: &Report, format: ReportFormat) -> Result<String, ReportError> {
        match format {
            ReportFormat::Json => Self::to_json(report),
            ReportFormat::Html => Ok(Self::to_html(report)),
        }
    }

    /// Write `relatorio.json` or `relatorio.html` into `dir`, replacing any
    /// previous report. Returns the written path.
    pub fn write(report: &Report, format: ReportFormat, dir: &Path) -> Result<PathBuf, ReportError> {
        let content = Self::render(report, format)?;
        let path = dir.join(format.file_name());

        fs::create_dir_all(dir)
            .and_then(|_| fs::write(&path, content))
            .map_err(|source| ReportError::Write {
                path: path.clone(),
                source,
            })?;

        Ok(path)
    }
}

fn escape_html(text: &str) -> String {
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
