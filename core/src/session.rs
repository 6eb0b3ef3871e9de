use serde::{Deserialize, Serialize};

use crate::*;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionOutcome {
    Won,
    Lost,
    /// The autopilot ran out of moves before the board was cleared.
    Stalled,
    OutOfTurns,
}

/// Summary of one autopilot game against a simulated board.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SessionReport {
    pub outcome: SessionOutcome,
    pub turns: u32,
    pub actions: u32,
    pub gambles: u32,
    pub flags: u32,
    /// Planted mines minus flags on the board when the session ended.
    pub mines_left: isize,
    pub triggered_mine: Option<Coord2>,
}

/// Reveals `start`, then lets `autopilot` play `engine` until the game ends.
pub fn run_session(
    engine: &mut PlayEngine,
    autopilot: &mut Autopilot,
    start: Coord2,
    max_turns: u32,
) -> Result<SessionReport> {
    let mut report = SessionReport {
        outcome: SessionOutcome::OutOfTurns,
        turns: 0,
        actions: 0,
        gambles: 0,
        flags: 0,
        mines_left: engine.mines_left(),
        triggered_mine: None,
    };

    engine.reveal(start)?;

    while !engine.is_finished() {
        if report.turns >= max_turns {
            log::warn!("giving up after {max_turns} turns");
            break;
        }
        report.turns += 1;

        let actions = match autopilot.plan(&engine.snapshot())? {
            Turn::Act(actions) => actions,
            Turn::Finished => {
                report.outcome = SessionOutcome::Stalled;
                break;
            }
        };

        for action in actions {
            log::debug!("turn {}: {action:?}", report.turns);
            report.actions += 1;
            if action.is_gamble() {
                report.gambles += 1;
            }

            match action {
                Action::Chord(coords) => {
                    engine.chord_reveal(coords)?;
                }
                Action::Reveal(coords) | Action::Blind(coords) => {
                    engine.reveal(coords)?;
                }
                Action::Guess(guess) => {
                    engine.reveal(guess.coords)?;
                }
                Action::Flag(coords) => {
                    if engine.toggle_flag(coords)?.has_update() {
                        report.flags += 1;
                    }
                }
            }

            if engine.is_finished() {
                break;
            }
        }
    }

    report.outcome = match engine.state() {
        EngineState::Won => SessionOutcome::Won,
        EngineState::Lost => SessionOutcome::Lost,
        EngineState::Ready | EngineState::Active => report.outcome,
    };
    report.mines_left = engine.mines_left();
    report.triggered_mine = engine.triggered_mine();
    log::info!(
        "session {:?} after {} turns, {} gambles",
        report.outcome,
        report.turns,
        report.gambles
    );
    Ok(report)
}
