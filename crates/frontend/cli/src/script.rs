//! Port-write scripts: a JSON array of steps replayed against the chip.
//!
//! ```json
//! [
//!   { "op": "register", "reg": 1, "value": 96 },
//!   { "op": "control", "value": 0 },
//!   { "op": "control", "value": 64 },
//!   { "op": "data", "values": [1, 2, 3] },
//!   { "op": "run", "dots": 342 },
//!   { "op": "frames", "count": 1 }
//! ]
//! ```

use anyhow::{Context, Result};
use emu_sega_vdp::Vdp;
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Step {
    Control { value: u8 },
    Data { values: Vec<u8> },
    Register { reg: u8, value: u8 },
    Cram { index: u8, value: u8 },
    StatusRead,
    Run { dots: u64 },
    Frames { count: u32 },
    Compat { enabled: bool },
}

pub fn load(path: &Path) -> Result<Vec<Step>> {
    let text = std::fs::read_to_string(path).with_context(|| format!("reading script {}", path.display()))?;
    parse(&text).with_context(|| format!("parsing script {}", path.display()))
}

pub fn parse(text: &str) -> Result<Vec<Step>> {
    Ok(serde_json::from_str(text)?)
}

/// Replay `steps`, returning the status bytes read along the way.
pub fn apply(vdp: &mut Vdp, steps: &[Step]) -> Vec<u8> {
    let mut status_reads = Vec::new();
    for step in steps {
        match step {
            Step::Control { value } => vdp.control_write(*value),
            Step::Data { values } => values.iter().for_each(|&v| vdp.data_write(v)),
            Step::Register { reg, value } => vdp.write_register(*reg, *value),
            Step::Cram { index, value } => vdp.write_cram(*index, *value),
            Step::StatusRead => status_reads.push(vdp.control_read()),
            Step::Run { dots } => vdp.run(*dots),
            Step::Frames { count } => (0..*count).for_each(|_| vdp.run_frame()),
            Step::Compat { enabled } => vdp.set_sega315_5124_compatibility_mode(*enabled),
        }
    }
    status_reads
}
