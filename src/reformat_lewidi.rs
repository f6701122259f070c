/*
cargo run --bin reformat_lewidi --release

cargo run --bin reformat_lewidi -- \
    --data-dir data_post-competition/HS-Brexit_dataset \
    --log-dir  logs
*/

use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use log::info;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use simplelog::{Config as LogConfig, LevelFilter, WriteLogger};
use std::fs::{self, create_dir_all, File};
use std::path::{Path, PathBuf};

// Both lists are fixed; every (file, policy) pair yields one output file
// written next to the input.
const FILE_NAMES: [&str; 3] = [
    "HS-Brexit_test.json",
    "HS-Brexit_dev.json",
    "HS-Brexit_train.json",
];

const POLICIES: [ReformatPolicy; 4] = [
    ReformatPolicy::AnnotationsToHardLabel,
    ReformatPolicy::SoftToHardLabel,
    ReformatPolicy::AnnotationsToSoftLabel,
    ReformatPolicy::AnnotationsToSoftLabels,
];

const QUESTION_SUFFIX: &str = " hate speech or not (0/1)?";

// CLI parameters
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    // Directory holding the LeWiDi JSON files; outputs land beside them
    #[arg(long, default_value = "data_post-competition/HS-Brexit_dataset")]
    data_dir: PathBuf,
    #[arg(long, default_value = "logs")]
    log_dir: PathBuf,
}

// One annotated LeWiDi instance. The reformatters read text, annotations,
// hard_label and soft_label; the remaining fields are declared so their
// types are still checked when present.
#[derive(Debug, Deserialize)]
#[allow(dead_code)]
struct LewidiInstance {
    text: String,
    #[serde(default)]
    annotation_task: String,
    #[serde(default)]
    number_of_annotations: u32,
    // comma-separated per-annotator labels, e.g. "0,1,1"
    annotations: String,
    #[serde(default)]
    annotators: String,
    #[serde(default)]
    lang: String,
    hard_label: String,
    // label ("0"/"1") -> probability; keys may be missing
    #[serde(default)]
    soft_label: Map<String, Value>,
    #[serde(default)]
    split: String,
    #[serde(default)]
    other_info: Map<String, Value>,
}

#[derive(Debug, Serialize)]
struct QaContext {
    title: String,
    text: String,
}

// QA-style record produced for every instance; answers always holds the
// single target string.
#[derive(Debug, Serialize)]
struct ReformattedRecord {
    question: String,
    target: String,
    answers: Vec<String>,
    ctxs: Vec<QaContext>,
}

// The four reformatting policies. They share the question construction and
// differ in how target/answers/ctxs are derived from the annotation fields;
// `id` is the stable name baked into the output file naming.
#[derive(Debug, Clone, Copy)]
enum ReformatPolicy {
    AnnotationsToHardLabel,
    SoftToHardLabel,
    AnnotationsToSoftLabel,
    AnnotationsToSoftLabels,
}

impl ReformatPolicy {
    fn id(self) -> &'static str {
        match self {
            Self::AnnotationsToHardLabel => "from_annotations_to_hard_label",
            Self::SoftToHardLabel => "from_soft_to_hard_label",
            Self::AnnotationsToSoftLabel => "from_annotations_to_soft_label",
            Self::AnnotationsToSoftLabels => "from_annotations_to_soft_labels",
        }
    }

    fn apply(self, inst: &LewidiInstance) -> ReformattedRecord {
        let target = match self {
            Self::AnnotationsToHardLabel | Self::SoftToHardLabel => inst.hard_label.clone(),
            Self::AnnotationsToSoftLabel => soft_label_prob(&inst.soft_label, "1"),
            Self::AnnotationsToSoftLabels => format!(
                "{}{}/",
                soft_label_prob(&inst.soft_label, "0"),
                soft_label_prob(&inst.soft_label, "1"),
            ),
        };

        let ctxs = match self {
            // one context per soft-label value, in file order
            Self::SoftToHardLabel => inst
                .soft_label
                .values()
                .map(|v| QaContext {
                    title: String::new(),
                    text: v.to_string(),
                })
                .collect(),
            // one context per comma-split annotation segment
            _ => inst
                .annotations
                .split(',')
                .map(|segment| QaContext {
                    title: String::new(),
                    text: segment.to_string(),
                })
                .collect(),
        };

        ReformattedRecord {
            question: format!("{}{QUESTION_SUFFIX}", inst.text),
            answers: vec![target.clone()],
            target,
            ctxs,
        }
    }
}

// Probability string for one soft-label key, "0" when the key is absent
fn soft_label_prob(soft_label: &Map<String, Value>, key: &str) -> String {
    match soft_label.get(key) {
        Some(v) => v.to_string(),
        None => "0".to_string(),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // logging setup
    create_dir_all(&cli.log_dir)?;
    let ts = Local::now().format("%Y%m%d_%H%M%S");
    let log_path = cli.log_dir.join(format!("reformat_lewidi_{ts}.log"));
    WriteLogger::init(
        LevelFilter::Info,
        LogConfig::default(),
        File::create(&log_path)?,
    )?;
    info!("Starting LeWiDi reformatting");

    let mut outputs_written = 0usize;

    for file_name in FILE_NAMES {
        let file_path = cli.data_dir.join(file_name);
        let instances = read_instances(&file_path)?;
        info!("Loaded {} records from {:?}", instances.len(), file_path);

        for policy in POLICIES {
            let reformatted = reformat_all(policy, &instances);
            let out_path = output_path(&file_path, policy);
            let pretty = serde_json::to_string_pretty(&reformatted)?;
            fs::write(&out_path, pretty)
                .with_context(|| format!("writing {}", out_path.display()))?;
            info!("Wrote {} records → {:?}", reformatted.len(), out_path);
            outputs_written += 1;
        }
    }

    println!("\n=== Reformat summary ===");
    println!("Input files     : {}", FILE_NAMES.len());
    println!("Outputs written : {}", outputs_written);
    println!("Log file        : {:?}", log_path);

    Ok(())
}

// helpers
fn read_instances(path: &Path) -> Result<Vec<LewidiInstance>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    parse_instances(&raw).with_context(|| format!("parsing {}", path.display()))
}

fn parse_instances(raw: &str) -> Result<Vec<LewidiInstance>> {
    let records: Map<String, Value> =
        serde_json::from_str(raw).context("top-level JSON must be an object of records")?;

    let mut instances = Vec::with_capacity(records.len());
    for (id, value) in records {
        let inst: LewidiInstance =
            serde_json::from_value(value).with_context(|| format!("record {id}"))?;
        instances.push(inst);
    }
    Ok(instances)
}

// Apply one policy to every instance, in file order; record ids are dropped
fn reformat_all(policy: ReformatPolicy, instances: &[LewidiInstance]) -> Vec<ReformattedRecord> {
    instances.iter().map(|inst| policy.apply(inst)).collect()
}

// <input-stem>_<policy-id>.json, in the input's directory
fn output_path(input: &Path, policy: ReformatPolicy) -> PathBuf {
    let stem = input.file_stem().and_then(|s| s.to_str()).unwrap_or_default();
    input.with_file_name(format!("{stem}_{}.json", policy.id()))
}
