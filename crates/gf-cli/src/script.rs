//! Scripted input for headless runs.
//!
//! One directive per line: a tick or inclusive tick range, then the buttons
//! held during it.
//!
//! ```text
//! # walk right, running, and jump over the gap
//! 1-90   right run
//! 40     jump
//! 120    hook
//! ```
//!
//! Ticks count from 1. Overlapping directives combine; when both `left` and
//! `right` apply, the later line wins.

use std::path::Path;

use gf_simulation::{HorizontalIntent, InputSnapshot};

#[derive(Debug, Clone, PartialEq)]
struct Directive {
    from: u64,
    to: u64,
    horizontal: Option<HorizontalIntent>,
    run: bool,
    jump: bool,
    hook: bool,
}

/// A parsed input script.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Script {
    directives: Vec<Directive>,
}

impl Script {
    pub fn from_file(path: &Path) -> Result<Self, String> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| format!("cannot read script {}: {e}", path.display()))?;
        Self::parse(&text).map_err(|e| format!("{}: {e}", path.display()))
    }

    pub fn parse(text: &str) -> Result<Self, String> {
        let mut directives = Vec::new();
        for (index, raw) in text.lines().enumerate() {
            let line = raw.split('#').next().unwrap_or("").trim();
            if line.is_empty() {
                continue;
            }
            let directive =
                parse_directive(line).map_err(|e| format!("line {}: {e}", index + 1))?;
            directives.push(directive);
        }
        Ok(Self { directives })
    }

    /// Input held on `tick`.
    pub fn input_at(&self, tick: u64) -> InputSnapshot {
        let mut input = InputSnapshot::idle();
        for d in self.directives.iter().filter(|d| (d.from..=d.to).contains(&tick)) {
            if let Some(horizontal) = d.horizontal {
                input.horizontal = horizontal;
            }
            input.run_held |= d.run;
            input.jump_pressed |= d.jump;
            input.interact_pressed |= d.hook;
        }
        input
    }

    /// Last tick any directive covers.
    pub fn last_tick(&self) -> u64 {
        self.directives.iter().map(|d| d.to).max().unwrap_or(0)
    }
}

fn parse_directive(line: &str) -> Result<Directive, String> {
    let mut words = line.split_whitespace();
    let range = words.next().ok_or("missing tick")?;
    let (from, to) = parse_range(range)?;

    let mut directive = Directive {
        from,
        to,
        horizontal: None,
        run: false,
        jump: false,
        hook: false,
    };
    let mut any = false;
    for word in words {
        any = true;
        match word {
            "left" => directive.horizontal = Some(HorizontalIntent::Left),
            "right" => directive.horizontal = Some(HorizontalIntent::Right),
            "stop" => directive.horizontal = Some(HorizontalIntent::Stop),
            "run" => directive.run = true,
            "jump" => directive.jump = true,
            "hook" => directive.hook = true,
            other => return Err(format!("unknown action \"{other}\"")),
        }
    }
    if !any {
        return Err("no actions".to_string());
    }
    Ok(directive)
}

fn parse_range(range: &str) -> Result<(u64, u64), String> {
    let tick = |s: &str| {
        s.parse::<u64>()
            .ok()
            .filter(|t| *t > 0)
            .ok_or_else(|| format!("invalid tick \"{s}\""))
    };
    let (from, to) = match range.split_once('-') {
        Some((a, b)) => (tick(a)?, tick(b)?),
        None => {
            let t = tick(range)?;
            (t, t)
        }
    };
    if to < from {
        return Err(format!("range {range} ends before it starts"));
    }
    Ok((from, to))
}
