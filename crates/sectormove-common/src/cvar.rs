// cvar.rs — console variables
//
// Movement rules (dropoff policy, auto-aim, co-op) live in console variables.
// Latched variables queue their new value until the next level start so the
// rules never change while a level is running.

use crate::common::com_printf;

use parking_lot::Mutex;
use std::collections::HashMap;

// cvar flags
pub const CVAR_ARCHIVE: i32 = 1; // written by write_variables
pub const CVAR_NOSET: i32 = 8; // only force_set may change it
pub const CVAR_LATCH: i32 = 16; // waits for the next level start

#[derive(Debug, Clone, PartialEq)]
pub struct Cvar {
    pub name: String,
    pub string: String,
    pub latched_string: Option<String>,
    pub flags: i32,
    /// Set whenever `string` changes; cleared by whoever reads it.
    pub modified: bool,
}

#[derive(Debug, Default)]
pub struct CvarContext {
    vars: Vec<Cvar>,
    by_name: HashMap<String, usize>,
}

impl CvarContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn find_var(&self, name: &str) -> Option<&Cvar> {
        self.by_name.get(name).map(|&i| &self.vars[i])
    }

    /// String value, or "" when the variable does not exist.
    pub fn variable_string(&self, name: &str) -> &str {
        self.find_var(name).map_or("", |v| v.string.as_str())
    }

    /// Register a variable. An existing variable keeps its value and gains
    /// the extra flags.
    pub fn get(&mut self, name: &str, value: &str, flags: i32) -> &Cvar {
        let idx = match self.by_name.get(name) {
            Some(&i) => {
                self.vars[i].flags |= flags;
                i
            }
            None => {
                self.vars.push(Cvar {
                    name: name.to_string(),
                    string: value.to_string(),
                    latched_string: None,
                    flags,
                    modified: true,
                });
                self.by_name.insert(name.to_string(), self.vars.len() - 1);
                self.vars.len() - 1
            }
        };
        &self.vars[idx]
    }

    /// Change a variable from the console. NOSET variables refuse; LATCH
    /// variables queue the value while a level is running.
    pub fn set(&mut self, name: &str, value: &str, level_running: bool) {
        let Some(&idx) = self.by_name.get(name) else {
            self.get(name, value, 0);
            return;
        };
        let var = &mut self.vars[idx];

        if var.flags & CVAR_NOSET != 0 {
            com_printf(&format!("{} is write protected.\n", name));
            return;
        }

        if var.flags & CVAR_LATCH != 0 && level_running {
            if var.latched_string.as_deref() == Some(value) {
                return;
            }
            if var.latched_string.is_none() && var.string == value {
                return;
            }
            com_printf(&format!("{} will be changed for next level.\n", name));
            var.latched_string = Some(value.to_string());
            return;
        }

        var.latched_string = None;
        assign(var, value);
    }

    /// Change a variable regardless of its flags.
    pub fn force_set(&mut self, name: &str, value: &str) {
        let Some(&idx) = self.by_name.get(name) else {
            self.get(name, value, 0);
            return;
        };
        let var = &mut self.vars[idx];
        var.latched_string = None;
        assign(var, value);
    }

    /// Apply every queued latched value. Called when a level starts; returns
    /// the names that changed.
    pub fn get_latched_vars(&mut self) -> Vec<String> {
        let mut applied = Vec::new();
        for var in &mut self.vars {
            if let Some(latched) = var.latched_string.take() {
                assign(var, &latched);
                applied.push(var.name.clone());
            }
        }
        applied
    }

    /// Console handling: `name` prints the value, `name value` sets it.
    /// Returns false when `name` is not a variable.
    pub fn command(&mut self, name: &str, value: Option<&str>, level_running: bool) -> bool {
        let Some(var) = self.find_var(name) else {
            return false;
        };
        match value {
            None => com_printf(&format!("\"{}\" is \"{}\"\n", var.name, var.string)),
            Some(v) => self.set(name, v, level_running),
        }
        true
    }

    /// Write `set name "value"` lines for every archived variable.
    pub fn write_variables(&self, writer: &mut dyn std::io::Write) -> std::io::Result<()> {
        for var in self.vars.iter().filter(|v| v.flags & CVAR_ARCHIVE != 0) {
            writeln!(writer, "set {} \"{}\"", var.name, var.string)?;
        }
        Ok(())
    }
}

fn assign(var: &mut Cvar, value: &str) {
    if var.string != value {
        var.string = value.to_string();
        var.modified = true;
    }
}

// ============================================================
// Process-wide registry
// ============================================================

static CVARS: Mutex<Option<CvarContext>> = Mutex::new(None);

pub fn cvar_init() {
    *CVARS.lock() = Some(CvarContext::new());
}

pub fn cvar_shutdown() {
    *CVARS.lock() = None;
}

/// Run `f` against the process-wide variables. None before `cvar_init`.
pub fn with_cvars<F, R>(f: F) -> Option<R>
where
    F: FnOnce(&mut CvarContext) -> R,
{
    CVARS.lock().as_mut().map(f)
}
