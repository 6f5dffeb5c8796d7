use std::{sync::Arc, time::Duration};

use parking_lot::Mutex;

use crate::{
    chip8::ChipSet,
    devices::{DisplayCommands, KeyboardCommands, SoundCommands},
    opcode::Operation,
    timer::TimedWorker,
};

/// Will drive the chip on a worker, one step every `interval`
/// (see [`cpu::INTERVAL`](crate::definitions::cpu::INTERVAL)).
///
/// Before each step the host keyboard is copied into the chip, afterwards
/// changed frames go to the display and tone edges to the sound device.
/// The first failing step halts the chip, it is not stepped again.
pub fn run<W, D, K, S>(
    chip: Arc<Mutex<ChipSet>>,
    mut display: D,
    keyboard: K,
    mut sound: S,
    interval: Duration,
) -> W
where
    W: TimedWorker,
    D: DisplayCommands + Send + 'static,
    K: KeyboardCommands + Send + 'static,
    S: SoundCommands + Send + 'static,
{
    let mut halted = false;

    let inner_run = move || {
        if halted {
            return;
        }

        let mut chip = chip.lock();
        chip.set_keyboard(&keyboard.get_keyboard());

        match chip.step() {
            Ok(operation) => {
                if matches!(operation, Operation::Draw) {
                    display.display(chip.get_display());
                }
                if chip.tone() {
                    sound.beep();
                }
            }
            Err(err) => {
                log::error!("An unexpected error occured during execution: {}", err);
                log::warn!(
                    "halting '{}' at {:#06X}",
                    chip.get_name(),
                    chip.get_program_counter()
                );
                halted = true;
            }
        }
    };

    let mut worker = W::new();
    worker.start(inner_run, interval);
    worker
}
