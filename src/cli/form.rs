// ============================================================
// Layer 1 — Interactive Form
// ============================================================
// Line-oriented stand-in for a desktop form. One command per
// line; a failing command prints a message and the loop goes
// on, so a typo never ends the session.
//
//   set <field> <value>   change a field ("set heating hot air")
//   show                  every field with its current value
//   options <field>       choices of a categorical field
//   predict               run the prediction
//   history               past predictions, most recent first
//   clear                 reset fields and result
//   info                  network architecture
//   help                  this list
//   quit                  leave

use anyhow::Result;
use std::io::{BufRead, Write};

use crate::application::predict_use_case::{PredictionSession, PredictionStage};
use crate::domain::{
    fields::{help_for, label_for},
    prediction::format_currency,
    traits::PricePredictor,
};
use crate::error::EstimatorError;

const HELP: &str = "\
Commands:
  set <field> <value>   change a field value
  show                  show all fields
  options <field>       list the choices of a selection field
  predict               estimate the price
  history               past predictions, most recent first
  clear                 reset the form
  info                  model architecture
  help                  show this list
  quit                  leave the form";

/// Read commands from `input` until `quit` or end of input.
pub fn run_form<P, R, W>(session: &mut PredictionSession<P>, input: R, mut out: W) -> Result<()>
where
    P: PricePredictor,
    R: BufRead,
    W: Write,
{
    writeln!(out, "House price estimator. Type 'help' for commands.")?;
    if session.is_demo() {
        writeln!(out, "Demo mode: no trained model found, predictions are disabled.")?;
    }
    write_prompt(&mut out)?;

    for line in input.lines() {
        let line = line?;
        let line = line.trim();
        let (command, rest) = line.split_once(' ').unwrap_or((line, ""));
        let rest = rest.trim();

        match command {
            "" => {}
            "quit" | "exit" => break,
            "help" => writeln!(out, "{HELP}")?,
            "show" => show(session, &mut out)?,
            "clear" => {
                session.clear();
                writeln!(out, "Form reset.")?;
            }
            "info" => writeln!(out, "{}", session.describe())?,
            "history" => history(session, &mut out)?,
            "options" => match session.options(rest) {
                Ok(options) => writeln!(out, "{}: {}", label_for(rest), options.join(" | "))?,
                Err(e)      => report(&mut out, &anyhow::Error::from(e))?,
            },
            "set" => {
                let (name, value) = rest.split_once(' ').unwrap_or((rest, ""));
                match session.set_field(name, value) {
                    Ok(())  => writeln!(out, "{} = {}", label_for(name), value.trim())?,
                    Err(e)  => report(&mut out, &anyhow::Error::from(e))?,
                }
            }
            "predict" | "submit" => {
                let outcome = session.submit();
                writeln!(out, "{}", steps(session.trail()))?;
                match outcome {
                    Ok(_)  => writeln!(out, "Estimated price: {}", session.display())?,
                    Err(e) => {
                        report(&mut out, &e)?;
                        writeln!(out, "Result: {}", session.display())?;
                    }
                }
            }
            other => writeln!(out, "Unknown command '{other}'. Type 'help' for commands.")?,
        }
        write_prompt(&mut out)?;
    }

    writeln!(out)?;
    Ok(())
}

fn steps(trail: &[PredictionStage]) -> String {
    let names: Vec<String> = trail.iter().map(ToString::to_string).collect();
    format!("[{}]", names.join(" -> "))
}

fn write_prompt<W: Write>(out: &mut W) -> Result<()> {
    write!(out, "> ")?;
    out.flush()?;
    Ok(())
}

/// Input mistakes are warnings; anything else is an error.
/// Neither ends the session.
fn report<W: Write>(out: &mut W, err: &anyhow::Error) -> Result<()> {
    let is_input = err
        .downcast_ref::<EstimatorError>()
        .is_some_and(EstimatorError::is_input_error);
    if is_input {
        writeln!(out, "warning: {err}")?;
    } else {
        tracing::error!("Prediction failed: {err:#}");
        writeln!(out, "error: {err:#}")?;
    }
    Ok(())
}

fn show<P: PricePredictor, W: Write>(session: &PredictionSession<P>, out: &mut W) -> Result<()> {
    let layout = session.layout();

    writeln!(out, "Numeric fields:")?;
    for name in &layout.numeric {
        let value = session.numeric_value(name).unwrap_or("");
        writeln!(out, "  {:<28} {:<16} {}", label_for(name), name, value)?;
        if let Some(help) = help_for(name) {
            writeln!(out, "  {:<28} {}", "", help)?;
        }
    }

    writeln!(out, "Selections:")?;
    for (name, _) in &layout.categorical {
        let value = session.category(name).unwrap_or("");
        writeln!(out, "  {:<28} {:<16} {}", label_for(name), name, value)?;
    }

    writeln!(out, "Result: {} ({})", session.display(), session.stage())?;
    Ok(())
}

fn history<P: PricePredictor, W: Write>(session: &PredictionSession<P>, out: &mut W) -> Result<()> {
    let mut empty = true;
    for (i, entry) in session.history().enumerate() {
        empty = false;
        writeln!(
            out,
            "{}. {} -> {} ({})",
            i + 1,
            entry.time,
            format_currency(entry.price),
            entry.description
        )?;
    }
    if empty {
        writeln!(out, "No predictions yet.")?;
    }
    Ok(())
}
