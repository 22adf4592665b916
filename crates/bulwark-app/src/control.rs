//! Control surface over a background game loop.
//!
//! Bridges callers to the game loop thread via the channel and shared
//! snapshot held in `AppState`.

use log::info;

use bulwark_core::commands::PlayerCommand;
use bulwark_core::state::GameStateSnapshot;
use bulwark_sim::engine::SimConfig;

use crate::game_loop;
use crate::state::{AppError, AppState, GameLoopCommand};

/// Start the simulation. Spawns the game loop thread if not already running.
pub fn start_simulation(state: &AppState, config: SimConfig) -> Result<(), AppError> {
    let mut running = state.running.lock().map_err(|_| AppError::LockPoisoned)?;

    if *running {
        return Err(AppError::AlreadyRunning);
    }

    let (cmd_tx, handle) = game_loop::spawn_game_loop(config, state.latest_snapshot.clone())?;

    let mut tx_lock = state.command_tx.lock().map_err(|_| AppError::LockPoisoned)?;
    *tx_lock = Some(cmd_tx);
    let mut handle_lock = state.loop_handle.lock().map_err(|_| AppError::LockPoisoned)?;
    *handle_lock = Some(handle);
    *running = true;

    Ok(())
}

/// Send a player command to the simulation.
pub fn send_command(state: &AppState, command: PlayerCommand) -> Result<(), AppError> {
    let tx_lock = state.command_tx.lock().map_err(|_| AppError::LockPoisoned)?;

    match tx_lock.as_ref() {
        Some(tx) => tx
            .send(GameLoopCommand::PlayerCommand(command))
            .map_err(|_| AppError::LoopStopped),
        None => Err(AppError::NotStarted),
    }
}

/// Get the latest snapshot, `None` before the first tick.
pub fn get_snapshot(state: &AppState) -> Result<Option<GameStateSnapshot>, AppError> {
    let lock = state
        .latest_snapshot
        .lock()
        .map_err(|_| AppError::LockPoisoned)?;
    Ok(lock.clone())
}

/// Ask the loop to shut down and wait for the thread to exit.
pub fn stop_simulation(state: &AppState) -> Result<(), AppError> {
    let mut running = state.running.lock().map_err(|_| AppError::LockPoisoned)?;
    if !*running {
        return Err(AppError::NotStarted);
    }

    if let Some(tx) = state
        .command_tx
        .lock()
        .map_err(|_| AppError::LockPoisoned)?
        .take()
    {
        // A closed channel means the loop already exited.
        let _ = tx.send(GameLoopCommand::Shutdown);
    }
    let handle = state
        .loop_handle
        .lock()
        .map_err(|_| AppError::LockPoisoned)?
        .take();
    if let Some(handle) = handle {
        handle.join().map_err(|_| AppError::LoopStopped)?;
    }
    *running = false;
    info!("simulation stopped");
    Ok(())
}
