// JSON document handed to the plotting side

use crate::pipeline::Report;
use anyhow::{Context, Result};
use log::info;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use streamflow::{Scheme, Termination};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportDocument {
    pub field: FieldExport,
    pub seeds: Vec<[f64; 2]>,
    pub runs: Vec<RunExport>,
}

/// Lattice nodes and their vectors, enough for a quiver plot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldExport {
    pub width: usize,
    pub height: usize,
    pub nodes: Vec<NodeExport>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NodeExport {
    pub x: usize,
    pub y: usize,
    pub u: f64,
    pub v: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunExport {
    pub label: String,
    pub scheme: Scheme,
    pub step_size: f64,
    pub steps: usize,
    pub streamlines: Vec<StreamlineExport>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamlineExport {
    pub termination: Termination,
    pub points: Vec<[f64; 2]>,
}

impl From<&Report> for ExportDocument {
    fn from(report: &Report) -> Self {
        let field = FieldExport {
            width: report.field.width(),
            height: report.field.height(),
            nodes: report
                .field
                .nodes()
                .map(|(x, y, v)| NodeExport { x, y, u: v.x, v: v.y })
                .collect(),
        };

        let runs = report
            .runs
            .iter()
            .map(|result| RunExport {
                label: result.run.label(),
                scheme: result.run.scheme,
                step_size: result.run.step_size,
                steps: result.run.steps,
                streamlines: result
                    .streamlines
                    .iter()
                    .map(|line| StreamlineExport {
                        termination: line.termination,
                        points: line.points.iter().map(|p| p.to_array()).collect(),
                    })
                    .collect(),
            })
            .collect();

        Self {
            field,
            seeds: report.seeds.iter().map(|p| p.to_array()).collect(),
            runs,
        }
    }
}

pub fn write_json(report: &Report, path: impl AsRef<Path>, pretty: bool) -> Result<()> {
    let path = path.as_ref();
    let document = ExportDocument::from(report);

    let file = File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    if pretty {
        serde_json::to_writer_pretty(&mut writer, &document)?;
    } else {
        serde_json::to_writer(&mut writer, &document)?;
    }
    writer.flush()?;

    info!(
        "Wrote {} runs over {} seeds to {}",
        document.runs.len(),
        document.seeds.len(),
        path.display()
    );
    Ok(())
}
