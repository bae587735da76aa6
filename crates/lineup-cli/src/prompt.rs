// Line-based interactive lineup builder.
//
// Reads answers from any BufRead and writes prompts to any Write, so the
// whole flow can be driven from a script in tests.

use std::io::{BufRead, Write};

use anyhow::{bail, Context};
use lineup_core::catalog::Catalog;
use lineup_core::codec::LabelCodec;
use lineup_core::formation::Formation;
use lineup_core::player::Price;
use lineup_core::prediction::{GoalCount, PredictionEntry, PredictionSet};
use lineup_core::roster::{self, RosterBuilder, RosterSelection};
use lineup_core::submission::LineupEntry;
use lineup_core::validate;

pub struct Prompter<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn say(&mut self, text: &str) -> anyhow::Result<()> {
        writeln!(self.output, "{text}")?;
        Ok(())
    }

    /// Ask a question and return the trimmed answer.
    pub fn ask(&mut self, question: &str) -> anyhow::Result<String> {
        write!(self.output, "{question} ")?;
        self.output.flush()?;

        let mut line = String::new();
        let read = self.input.read_line(&mut line).context("failed to read input")?;
        if read == 0 {
            bail!("input closed before the lineup was complete");
        }
        Ok(line.trim().to_string())
    }

    /// Show numbered options and return the chosen index. With `allow_skip`
    /// a blank answer returns `None`. Invalid answers are asked again.
    pub fn choose(
        &mut self,
        title: &str,
        options: &[String],
        allow_skip: bool,
    ) -> anyhow::Result<Option<usize>> {
        self.say(title)?;
        for (i, option) in options.iter().enumerate() {
            self.say(&format!("  {:>2}) {}", i + 1, option))?;
        }
        let hint = if allow_skip {
            format!("Choice [1-{}, blank to skip]:", options.len())
        } else {
            format!("Choice [1-{}]:", options.len())
        };

        loop {
            let answer = self.ask(&hint)?;
            if answer.is_empty() && allow_skip {
                return Ok(None);
            }
            match answer.parse::<usize>() {
                Ok(n) if (1..=options.len()).contains(&n) => return Ok(Some(n - 1)),
                _ => self.say(&format!("'{answer}' is not one of the options"))?,
            }
        }
    }
}

/// Walk the user through formation, slot picks and predictions.
pub fn pick_lineup<R: BufRead, W: Write>(
    prompter: &mut Prompter<R, W>,
    catalog: &Catalog,
    codec: &dyn LabelCodec,
    budget_cap: Price,
    predictions: Option<&PredictionSet>,
) -> anyhow::Result<LineupEntry> {
    let user = prompter.ask("Your name:")?;

    let formation_ids: Vec<String> = Formation::ALL.iter().map(|f| f.id().to_string()).collect();
    let formation = match prompter.choose("Formation", &formation_ids, false)? {
        Some(idx) => Formation::ALL[idx],
        None => bail!("no formation chosen"),
    };

    let mut builder = RosterBuilder::new(formation);
    let slots = builder.slots().to_vec();
    for slot in slots {
        let options = roster::choices(catalog, codec, slot.position);
        if options.is_empty() {
            prompter.say(&format!("No players available for {slot}, leaving it empty"))?;
            continue;
        }
        if let Some(idx) = prompter.choose(&slot.to_string(), &options, true)? {
            builder.choose(slot, &options[idx]);
        }

        let status = validate::budget_status(&builder.build(), codec, budget_cap);
        let marker = if status.is_over() { "  (over budget)" } else { "" };
        prompter.say(&format!("Team value: {} / {}{}", status.spent, status.cap, marker))?;
    }

    let selection = builder.build();
    show_pitch(prompter, &selection, formation)?;

    let mut entries = Vec::new();
    if let Some(set) = predictions {
        for fixture in &set.fixtures {
            let title = fixture.title();
            let winners: Vec<String> = fixture
                .winner_choices(&set.draw_label)
                .iter()
                .map(|s| s.to_string())
                .collect();
            let goals: Vec<String> = GoalCount::ALL.iter().map(|g| g.to_string()).collect();

            let winner = pick_required(prompter, &format!("{title}: winner"), &winners)?;
            let home = pick_required(prompter, &format!("{title}: {} goals", fixture.home), &goals)?;
            let away = pick_required(prompter, &format!("{title}: {} goals", fixture.away), &goals)?;

            entries.push(PredictionEntry {
                winner: winners[winner].clone(),
                home_goals: GoalCount::ALL[home],
                away_goals: GoalCount::ALL[away],
            });
        }
    }

    Ok(LineupEntry {
        user,
        formation,
        roster: selection,
        predictions: entries,
    })
}

fn pick_required<R: BufRead, W: Write>(
    prompter: &mut Prompter<R, W>,
    title: &str,
    options: &[String],
) -> anyhow::Result<usize> {
    match prompter.choose(title, options, false)? {
        Some(idx) => Ok(idx),
        None => bail!("no choice made for {title}"),
    }
}

/// Text rendering of the pitch: one line per filled slot with its coordinate.
pub fn show_pitch<R: BufRead, W: Write>(
    prompter: &mut Prompter<R, W>,
    selection: &RosterSelection,
    formation: Formation,
) -> anyhow::Result<()> {
    prompter.say(&format!(
        "Formation {formation} ({} of {} slots filled)",
        selection.filled_count(),
        formation.total_slots()
    ))?;
    for placement in selection.placements(formation) {
        prompter.say(&format!(
            "  {:<4} ({:.1}, {:.1})  {}",
            placement.position, placement.coord.0, placement.coord.1, placement.label
        ))?;
    }
    Ok(())
}
