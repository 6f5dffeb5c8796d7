use std::{convert::TryFrom, ops::Range};

use {
    crate::{
        definitions::{cpu, display, keyboard, memory, timer},
        devices::{Keyboard, Pixels},
        opcode::{
            self, ChipOpcodes, Opcode, Opcodes, Operation, ProgramCounter, ProgramCounterStep,
        },
        resources::Rom,
        timer::Timer,
        MemoryError, OpcodeError, ProcessError, StackError,
    },
    rand::{rngs::StdRng, RngCore, SeedableRng},
    tinyvec::ArrayVec,
};

/// The ChipSet struct represents the current state
/// of the system, it contains all the structures
/// needed for emulating an instant on the
/// Chip8 CPU.
pub struct ChipSet {
    /// the loaded rom, kept around for resets
    pub(super) rom: Rom,
    /// all two bytes long and stored big-endian
    pub(super) opcode: Opcode,
    /// - `0x000-0x1FF` - Chip 8 interpreter (contains font set in emu)
    /// - `0x050-0x0A0` - Used for the built in `4x5` pixel font set (`0-F`)
    /// - `0x200-0xFFF` - Program ROM and work RAM
    pub(super) memory: Box<[u8]>,
    /// `8-bit` data registers named `V0` to `VF`. The `VF` register doubles as a flag for some
    /// instructions; thus, it should be avoided. In an addition operation, `VF` is the carry flag,
    /// while in subtraction, it is the "no borrow" flag. In the draw instruction `VF` is set upon
    /// pixel collision.
    pub(super) registers: [u8; cpu::register::SIZE],
    /// The index for the register, this is a special register entry
    /// called index `I`
    pub(super) index_register: u16,
    /// The program counter is a CPU register in the computer processor which has the address of the
    /// next instruction to be executed from memory.
    pub(super) program_counter: usize,
    /// The stack is only used to store return addresses when subroutines are called.
    /// It allows for up to `16` levels of nesting.
    pub(super) stack: ArrayVec<[usize; cpu::stack::SIZE]>,
    /// Delay timer: This timer is intended to be used for timing the events of games. Its value
    /// can be set and read.
    pub(super) delay_timer: Timer,
    /// Sound timer: This timer is used for sound effects. When its value is nonzero, a beeping
    /// sound is made.
    pub(super) sound_timer: Timer,
    /// set for the cycle in which the sound timer ran out
    pub(super) tone: bool,
    /// The graphics of the Chip 8 are black and white and the screen has a total of `2048` pixels
    /// `(64 x 32)`, stored row by row.
    pub(super) display: Pixels,
    /// The hex keyboard, written by the host between two steps.
    pub(super) keyboard: Keyboard,
    /// The register that receives the next key press, while the
    /// chip is suspended by `FX0A`.
    pub(super) awaiting_key: Option<usize>,
    /// This stores the random number generator, used by the chipset.
    /// It is stored into the chipset, so as to enable simple mocking
    /// of the given type.
    pub(super) rng: Box<dyn RngCore + Send>,
}

impl ChipSet {
    /// will create a new chipset object, seeded from the os entropy source
    pub fn new(rom: Rom) -> Self {
        Self::with_rng(rom, StdRng::from_entropy())
    }

    /// will create a new chipset object that draws its random
    /// numbers from the given generator
    pub fn with_rng<R: RngCore + Send + 'static>(rom: Rom, rng: R) -> Self {
        let memory = Self::load_memory(&rom);
        Self {
            rom,
            opcode: 0,
            memory,
            registers: [0; cpu::register::SIZE],
            index_register: 0,
            program_counter: cpu::PROGRAM_COUNTER,
            stack: ArrayVec::new(),
            delay_timer: Timer::new(timer::INITIAL),
            sound_timer: Timer::new(timer::INITIAL),
            tone: false,
            display: [[false; display::WIDTH]; display::HEIGHT],
            keyboard: Keyboard::new(),
            awaiting_key: None,
            rng: Box::new(rng),
        }
    }

    /// builds the initial memory, fonts at `0x50` and the rom at `0x200`
    fn load_memory(rom: &Rom) -> Box<[u8]> {
        let mut ram = vec![0u8; memory::SIZE].into_boxed_slice();

        let fonts = display::fontset::LOCATION;
        ram[fonts..(fonts + display::fontset::FONTSET.len())]
            .copy_from_slice(&display::fontset::FONTSET);

        // the rom size is checked during rom creation
        let data = rom.get_data();
        ram[cpu::PROGRAM_COUNTER..(cpu::PROGRAM_COUNTER + data.len())].copy_from_slice(data);

        ram
    }

    /// Will put the chip back into its power on state with the same rom loaded.
    /// The random number generator is kept.
    pub fn reset(&mut self) {
        log::debug!("resetting the chip with rom '{}'", self.rom.get_name());

        self.memory = Self::load_memory(&self.rom);
        self.opcode = 0;
        self.registers = [0; cpu::register::SIZE];
        self.index_register = 0;
        self.program_counter = cpu::PROGRAM_COUNTER;
        self.stack.clear();
        self.delay_timer = Timer::new(timer::INITIAL);
        self.sound_timer = Timer::new(timer::INITIAL);
        self.tone = false;
        self.display = [[false; display::WIDTH]; display::HEIGHT];
        self.keyboard = Keyboard::new();
        self.awaiting_key = None;
    }

    /// will get the next opcode from memory
    pub(super) fn set_opcode(&mut self) -> Result<(), OpcodeError> {
        self.opcode = opcode::build_opcode(&self.memory, self.program_counter)?;
        Ok(())
    }

    /// will advance the program by a single step
    ///
    /// On error the program counter and the timers are left untouched.
    pub fn step(&mut self) -> Result<Operation, ProcessError> {
        let operation = match self.awaiting_key {
            Some(register) => self.resolve_key_wait(register),
            None => self.execute()?,
        };

        self.tick_timers();
        Ok(operation)
    }

    /// fetches, decodes and runs the opcode at the program counter
    fn execute(&mut self) -> Result<Operation, ProcessError> {
        self.set_opcode()?;
        log::trace!("opcode {:#06X} at {:#06X}", self.opcode, self.program_counter);

        match Opcodes::try_from(self.opcode) {
            Ok(opcode) => self.calc(&opcode),
            Err(OpcodeError::InvalidOpcode(opcode)) => {
                log::debug!(
                    "skipping unsupported opcode {:#06X} at {:#06X}",
                    opcode,
                    self.program_counter
                );
                self.advance(ProgramCounterStep::Next);
                Ok(Operation::None)
            }
            Err(err) => Err(err.into()),
        }
    }

    /// delivers the first pressed key to the waiting register, if any
    fn resolve_key_wait(&mut self, register: usize) -> Operation {
        match self.keyboard.first_pressed() {
            Some(key) => {
                log::debug!("key {:#X} resumes the chip", key);
                self.registers[register] = key as u8;
                self.awaiting_key = None;
                Operation::None
            }
            None => Operation::Wait,
        }
    }

    fn tick_timers(&mut self) {
        self.delay_timer.tick();
        self.tone = self.sound_timer.tick();
    }

    /// Will write keyboard data into internal keyboard representation.
    pub fn set_keyboard(&mut self, keys: &[bool; keyboard::SIZE]) {
        self.keyboard.set_mult(keys);
    }

    /// Will set the value of the given key
    pub fn set_key(&mut self, key: usize, to: bool) {
        self.keyboard.set_key(key, to)
    }

    /// Will toggle the given key
    pub fn toggle_key(&mut self, key: usize) {
        self.keyboard.toggle_key(key)
    }

    /// Will get the current state of the keyboard
    pub fn get_keyboard(&self) -> &Keyboard {
        &self.keyboard
    }

    /// will return the sound timer
    pub fn get_sound_timer(&self) -> u8 {
        self.sound_timer.get_value()
    }

    /// will return the delay timer
    pub fn get_delay_timer(&self) -> u8 {
        self.delay_timer.get_value()
    }

    /// Is true for the step in which the sound timer reached zero.
    pub fn tone(&self) -> bool {
        self.tone
    }

    /// Will return the current display configuration
    pub fn get_display(&self) -> &Pixels {
        &self.display
    }

    pub fn get_registers(&self) -> &[u8; cpu::register::SIZE] {
        &self.registers
    }

    pub fn get_index_register(&self) -> u16 {
        self.index_register
    }

    pub fn get_program_counter(&self) -> usize {
        self.program_counter
    }

    /// The return addresses, the last entry is the top of the stack.
    pub fn get_stack(&self) -> &[usize] {
        &self.stack
    }

    /// The opcode fetched during the last step.
    pub fn get_opcode(&self) -> Opcode {
        self.opcode
    }

    pub fn get_memory(&self) -> &[u8] {
        &self.memory
    }

    pub fn get_name(&self) -> &str {
        self.rom.get_name()
    }

    /// Is the register waiting for a key press, if the chip is suspended.
    pub fn is_awaiting_key(&self) -> Option<usize> {
        self.awaiting_key
    }

    /// Will push the pointer to the stack
    pub(super) fn push_stack(&mut self, pointer: usize) -> Result<(), StackError> {
        match self.stack.try_push(pointer) {
            None => Ok(()),
            Some(_) => Err(StackError::Full),
        }
    }

    /// Will pop from the stack
    pub(super) fn pop_stack(&mut self) -> Result<usize, StackError> {
        self.stack.pop().ok_or(StackError::Empty)
    }

    /// Will return the memory range `from..from + len`, if it lies fully inside the memory.
    pub(super) fn memory_range(&self, from: usize, len: usize) -> Result<Range<usize>, MemoryError> {
        let to = from + len;
        if to > self.memory.len() {
            Err(MemoryError::OutOfBounds {
                from,
                to,
                len: self.memory.len(),
            })
        } else {
            Ok(from..to)
        }
    }
}

impl ProgramCounter for ChipSet {
    fn advance(&mut self, step: ProgramCounterStep) {
        self.program_counter = step.apply(self.program_counter);
    }
}
