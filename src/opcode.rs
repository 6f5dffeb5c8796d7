//! Opcode abstractions, decoding and the dispatch contract of the chipset.
use std::convert::TryFrom;

use crate::{definitions::memory, OpcodeError, ProcessError};

/// the base mask used for generating all the other sub masks
pub(crate) const OPCODE_MASK_FFFF: u16 = u16::MAX;

/// the mask for the first twelve bits
pub(crate) const OPCODE_MASK_FFF0: u16 = OPCODE_MASK_FFFF << 4;

/// the mask for the first eight bits
pub(crate) const OPCODE_MASK_FF00: u16 = OPCODE_MASK_FFFF << 8;

/// the mask for the first four bits
pub(crate) const OPCODE_MASK_F000: u16 = OPCODE_MASK_FFFF << 12;

/// the mask for the last four bits
pub(crate) const OPCODE_MASK_000F: u16 = OPCODE_MASK_FFFF ^ OPCODE_MASK_FFF0;

/// the mask for the last eight bits
pub(crate) const OPCODE_MASK_00FF: u16 = OPCODE_MASK_FFFF ^ OPCODE_MASK_FF00;

/// the mask for the last twelve bits
pub(crate) const OPCODE_MASK_0FFF: u16 = OPCODE_MASK_FFFF ^ OPCODE_MASK_F000;

/// the size of a single byte
const BYTE_SIZE: u16 = 0x8;

/// the size of a single nibble
const NIBBLE_SIZE: u16 = BYTE_SIZE / 2;

/// a wrapper type for u16 to make it clear what is meant to be used
pub type Opcode = u16;

/// will build an opcode from data and the given point
/// # Arguments
///
/// - `data` - A slice of u8 data entries used to generate the opcodes
/// - `pointer` - Where in the data the opcode shall be extracted, so `pointer` and `pointer + 1` make
/// the opcode up
///
/// # Example
/// ```rust
/// # use chip::opcode::*;
/// # use chip::OpcodeError;
///  const OPCODES: [Opcode; 2] = [0x00EE, 0x1EDA];
///  const SPLIT_OPCODE: [u8; 4] = [0x00, 0xEE, 0x1E, 0xDA];
///  for (i, val) in OPCODES.iter().enumerate() {
///      let opcode = build_opcode(&SPLIT_OPCODE, i * 2).expect("This will work.");
///      assert_eq!(opcode, *val);
///  }
/// # let pointer = 3;
/// # let err = OpcodeError::MemoryInvalid {pointer, len: SPLIT_OPCODE.len() };
/// # assert_eq!(Err(err), build_opcode(&SPLIT_OPCODE, pointer));
/// ```
pub fn build_opcode(data: &[u8], pointer: usize) -> Result<Opcode, OpcodeError> {
    // controlling that there is no illegal access here
    if pointer < data.len() && pointer + 1 < data.len() {
        Ok(Opcode::from_be_bytes([data[pointer], data[pointer + 1]]))
    } else {
        Err(OpcodeError::MemoryInvalid {
            pointer,
            len: data.len(),
        })
    }
}

/// These are special traits used to filter out information
/// from opcodes
pub trait OpcodeTrait {
    /// The opcode class stored in the highest nibble `T___`
    fn t(&self) -> usize;

    /// The address stored in `_NNN`
    fn nnn(&self) -> usize;

    /// The register and constant stored in `_XKK`
    fn xkk(&self) -> (usize, u8);

    /// The two registers and the lowest nibble stored in `_XYN`
    fn xyn(&self) -> (usize, usize, usize);

    /// The two registers stored in `_XY_`
    fn xy(&self) -> (usize, usize);

    /// The register stored in `_X__`
    fn x(&self) -> usize;

    /// The lowest nibble `___N`
    fn n(&self) -> usize;
}

impl OpcodeTrait for Opcode {
    /// # Example
    /// ```rust
    /// # use chip::opcode::*;
    /// const BASE_OPCODE: Opcode = 0x1EDA;
    /// assert_eq!(BASE_OPCODE.t(), 0x1);
    /// ```
    fn t(&self) -> usize {
        ((self & OPCODE_MASK_F000) >> (3 * NIBBLE_SIZE)) as usize
    }

    /// # Example
    /// ```rust
    /// # use chip::opcode::*;
    ///  const BASE_OPCODE: Opcode = 0x1EDA;
    ///  assert_eq!(BASE_OPCODE.nnn(), 0xEDA)
    /// ```
    fn nnn(&self) -> usize {
        (self & OPCODE_MASK_0FFF) as usize
    }

    /// # Example
    /// ```rust
    /// # use chip::opcode::*;
    /// const BASE_OPCODE: Opcode = 0x1EDA;
    /// assert_eq!(BASE_OPCODE.xkk(), (0xE, 0xDA));
    /// ```
    fn xkk(&self) -> (usize, u8) {
        let x = self.x();
        let kk = (self & OPCODE_MASK_00FF) as u8;
        (x, kk)
    }

    /// ```rust
    /// # use chip::opcode::*;
    ///  const BASE_OPCODE: Opcode = 0x1EDA;
    ///  assert_eq!(BASE_OPCODE.xyn(), (0xE, 0xD, 0xA));
    /// ```
    fn xyn(&self) -> (usize, usize, usize) {
        let (x, y) = self.xy();
        (x, y, self.n())
    }

    /// ```rust
    /// # use chip::opcode::*;
    ///  const BASE_OPCODE: Opcode = 0x1EDA;
    ///  assert_eq!(BASE_OPCODE.xy(), (0xE, 0xD));
    /// ```
    fn xy(&self) -> (usize, usize) {
        const MASK: u16 = OPCODE_MASK_00FF ^ OPCODE_MASK_000F;
        let y = ((self & MASK) >> NIBBLE_SIZE) as usize;
        (self.x(), y)
    }

    /// # Example
    /// ```rust
    /// # use chip::opcode::*;
    ///  const BASE_OPCODE: Opcode = 0x1EDA;
    ///  assert_eq!(BASE_OPCODE.x(), 0xE);
    /// ```
    fn x(&self) -> usize {
        ((self & OPCODE_MASK_0FFF & OPCODE_MASK_FF00) >> BYTE_SIZE) as usize
    }

    /// ```rust
    /// # use chip::opcode::*;
    ///  const BASE_OPCODE: Opcode = 0x1EDA;
    ///  assert_eq!(BASE_OPCODE.n(), 0xA);
    /// ```
    fn n(&self) -> usize {
        (self & OPCODE_MASK_000F) as usize
    }
}

#[derive(Debug, PartialEq, Clone, Copy)]
/// Represents the program steps that the chip
/// can take.
pub enum ProgramCounterStep {
    /// Will not change the program counter
    None,
    /// Will move the program counter to the next opcode
    Next,
    /// Will skip the next opcode
    Skip,
    /// Will simply move the program counter to the given location.
    Jump(usize),
}

impl ProgramCounterStep {
    /// Will return a Skip if the condition is true.
    ///
    /// # Example
    /// ```rust
    /// # use chip::opcode::ProgramCounterStep;
    /// assert_eq!(ProgramCounterStep::Next, ProgramCounterStep::cond(false));
    /// assert_eq!(ProgramCounterStep::Skip, ProgramCounterStep::cond(true));
    /// ```
    #[inline]
    pub fn cond(cond: bool) -> Self {
        if cond {
            ProgramCounterStep::Skip
        } else {
            ProgramCounterStep::Next
        }
    }

    /// Calculates the program counter that follows `pc` after taking this step.
    ///
    /// ```rust
    /// # use chip::opcode::ProgramCounterStep;
    /// assert_eq!(ProgramCounterStep::Next.apply(0x200), 0x202);
    /// assert_eq!(ProgramCounterStep::Skip.apply(0x200), 0x204);
    /// assert_eq!(ProgramCounterStep::Jump(0x300).apply(0x200), 0x300);
    /// ```
    #[inline]
    pub fn apply(&self, pc: usize) -> usize {
        match *self {
            ProgramCounterStep::None => pc,
            ProgramCounterStep::Next => pc + memory::opcodes::SIZE,
            ProgramCounterStep::Skip => pc + 2 * memory::opcodes::SIZE,
            ProgramCounterStep::Jump(pointer) => pointer,
        }
    }
}

/// Decodes the family specific fields of an opcode, `None` means the
/// secondary key of the family is not registered.
trait Decode: Sized {
    fn decode(opcode: Opcode) -> Option<Self>;
}

/// implDecodeSub is a macro generating the lookup from a secondary
/// key (low nibble or low byte) to the sub operation of a family.
macro_rules! implDecodeSub {
    ($type_name:ty : $key:ident : $( $value:literal => $variant:expr ),+ $(,)? ) => {
        impl Decode for $type_name {
            fn decode(opcode: Opcode) -> Option<Self> {
                match opcode.$key() {
                    $(
                        $value => Some($variant),
                    )+
                    _ => None,
                }
            }
        }
    };
}

macro_rules! implDecodeFields {
    ($type_name:ident : nnn) => {
        impl Decode for $type_name {
            fn decode(opcode: Opcode) -> Option<Self> {
                Some($type_name { nnn: opcode.nnn() })
            }
        }
    };
    ($type_name:ident : xkk) => {
        impl Decode for $type_name {
            fn decode(opcode: Opcode) -> Option<Self> {
                let (x, kk) = opcode.xkk();
                Some($type_name { x, kk })
            }
        }
    };
    ($type_name:ident : xy) => {
        impl Decode for $type_name {
            fn decode(opcode: Opcode) -> Option<Self> {
                let (x, y) = opcode.xy();
                Some($type_name { x, y })
            }
        }
    };
    ($type_name:ident : xyn) => {
        impl Decode for $type_name {
            fn decode(opcode: Opcode) -> Option<Self> {
                let (x, y, n) = opcode.xyn();
                Some($type_name { x, y, n })
            }
        }
    };
    ($type_name:ident : xy ops) => {
        impl Decode for $type_name {
            fn decode(opcode: Opcode) -> Option<Self> {
                let (x, y) = opcode.xy();
                let ops = Decode::decode(opcode)?;
                Some($type_name { ops, x, y })
            }
        }
    };
    ($type_name:ident : x ops) => {
        impl Decode for $type_name {
            fn decode(opcode: Opcode) -> Option<Self> {
                let x = opcode.x();
                let ops = Decode::decode(opcode)?;
                Some($type_name { ops, x })
            }
        }
    };
}

/// The `0___` family, keyed by the lowest nibble.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum System {
    /// `00E0` - CLS
    Clear,
    /// `00EE` - RET
    Return,
}

implDecodeSub!(System : n :
    0x0 => System::Clear,
    0xE => System::Return,
);

/// Opcodes of the form `_NNN`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Address {
    pub nnn: usize,
}

implDecodeFields!(Address: nnn);

/// Opcodes of the form `_XKK`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegisterConst {
    pub x: usize,
    pub kk: u8,
}

implDecodeFields!(RegisterConst: xkk);

/// Opcodes of the form `_XY_`, the lowest nibble is ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegisterPair {
    pub x: usize,
    pub y: usize,
}

implDecodeFields!(RegisterPair: xy);

/// The `8XY_` family, keyed by the lowest nibble.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithmeticOpcode {
    /// `8XY0` - LD Vx, Vy
    Load,
    /// `8XY1` - OR Vx, Vy
    Or,
    /// `8XY2` - AND Vx, Vy
    And,
    /// `8XY3` - XOR Vx, Vy
    Xor,
    /// `8XY4` - ADD Vx, Vy
    Add,
    /// `8XY5` - SUB Vx, Vy
    Sub,
    /// `8XY6` - SHR Vx
    ShiftRight,
    /// `8XY7` - SUBN Vx, Vy
    SubNegated,
    /// `8XYE` - SHL Vx
    ShiftLeft,
}

implDecodeSub!(ArithmeticOpcode : n :
    0x0 => ArithmeticOpcode::Load,
    0x1 => ArithmeticOpcode::Or,
    0x2 => ArithmeticOpcode::And,
    0x3 => ArithmeticOpcode::Xor,
    0x4 => ArithmeticOpcode::Add,
    0x5 => ArithmeticOpcode::Sub,
    0x6 => ArithmeticOpcode::ShiftRight,
    0x7 => ArithmeticOpcode::SubNegated,
    0xE => ArithmeticOpcode::ShiftLeft,
);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Arithmetic {
    pub ops: ArithmeticOpcode,
    pub x: usize,
    pub y: usize,
}

implDecodeFields!(Arithmetic: xy ops);

/// `DXYN` - DRW Vx, Vy, n
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sprite {
    pub x: usize,
    pub y: usize,
    pub n: usize,
}

implDecodeFields!(Sprite: xyn);

/// The `EX__` family, keyed by the lowest nibble.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOpcode {
    /// `EX9E` - SKP Vx
    Pressed,
    /// `EXA1` - SKNP Vx
    NotPressed,
}

implDecodeSub!(KeyOpcode : n :
    0xE => KeyOpcode::Pressed,
    0x1 => KeyOpcode::NotPressed,
);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Key {
    pub ops: KeyOpcode,
    pub x: usize,
}

implDecodeFields!(Key: x ops);

/// The `FX__` family, keyed by the lowest byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MiscOpcode {
    /// `FX07` - LD Vx, DT
    GetDelayTimer,
    /// `FX0A` - LD Vx, K
    AwaitKeyPress,
    /// `FX15` - LD DT, Vx
    SetDelayTimer,
    /// `FX18` - LD ST, Vx
    SetSoundTimer,
    /// `FX1E` - ADD I, Vx
    AddVxToI,
    /// `FX29` - LD F, Vx
    SetIToSprite,
    /// `FX33` - LD B, Vx
    StoreBCD,
    /// `FX55` - LD [I], Vx
    StoreV0ToVx,
    /// `FX65` - LD Vx, [I]
    FillV0ToVx,
}

/// Helper so that [`implDecodeSub`] can key on the lowest byte.
trait LowByte {
    fn kk(&self) -> u8;
}

impl LowByte for Opcode {
    fn kk(&self) -> u8 {
        self.xkk().1
    }
}

implDecodeSub!(MiscOpcode : kk :
    0x07 => MiscOpcode::GetDelayTimer,
    0x0A => MiscOpcode::AwaitKeyPress,
    0x15 => MiscOpcode::SetDelayTimer,
    0x18 => MiscOpcode::SetSoundTimer,
    0x1E => MiscOpcode::AddVxToI,
    0x29 => MiscOpcode::SetIToSprite,
    0x33 => MiscOpcode::StoreBCD,
    0x55 => MiscOpcode::StoreV0ToVx,
    0x65 => MiscOpcode::FillV0ToVx,
);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Misc {
    pub ops: MiscOpcode,
    pub x: usize,
}

implDecodeFields!(Misc: x ops);

/// A fully decoded instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Opcodes {
    /// `0___`
    System(System),
    /// `1NNN` - JP nnn
    Jump(Address),
    /// `2NNN` - CALL nnn
    Call(Address),
    /// `3XKK` - SE Vx, kk
    SkipEqualConst(RegisterConst),
    /// `4XKK` - SNE Vx, kk
    SkipNotEqualConst(RegisterConst),
    /// `5XY_` - SE Vx, Vy
    SkipEqualRegister(RegisterPair),
    /// `6XKK` - LD Vx, kk
    LoadConst(RegisterConst),
    /// `7XKK` - ADD Vx, kk
    AddConst(RegisterConst),
    /// `8XY_`
    Arithmetic(Arithmetic),
    /// `9XY_` - SNE Vx, Vy
    SkipNotEqualRegister(RegisterPair),
    /// `ANNN` - LD I, nnn
    LoadIndex(Address),
    /// `BNNN` - JP V0, nnn
    JumpOffset(Address),
    /// `CXKK` - RND Vx, kk
    Random(RegisterConst),
    /// `DXYN` - DRW Vx, Vy, n
    Draw(Sprite),
    /// `EX__`
    Key(Key),
    /// `FX__`
    Misc(Misc),
}

impl TryFrom<Opcode> for Opcodes {
    type Error = OpcodeError;

    fn try_from(value: Opcode) -> Result<Self, Self::Error> {
        let decoded = match value.t() {
            0x0 => Decode::decode(value).map(Opcodes::System),
            0x1 => Decode::decode(value).map(Opcodes::Jump),
            0x2 => Decode::decode(value).map(Opcodes::Call),
            0x3 => Decode::decode(value).map(Opcodes::SkipEqualConst),
            0x4 => Decode::decode(value).map(Opcodes::SkipNotEqualConst),
            0x5 => Decode::decode(value).map(Opcodes::SkipEqualRegister),
            0x6 => Decode::decode(value).map(Opcodes::LoadConst),
            0x7 => Decode::decode(value).map(Opcodes::AddConst),
            0x8 => Decode::decode(value).map(Opcodes::Arithmetic),
            0x9 => Decode::decode(value).map(Opcodes::SkipNotEqualRegister),
            0xA => Decode::decode(value).map(Opcodes::LoadIndex),
            0xB => Decode::decode(value).map(Opcodes::JumpOffset),
            0xC => Decode::decode(value).map(Opcodes::Random),
            0xD => Decode::decode(value).map(Opcodes::Draw),
            0xE => Decode::decode(value).map(Opcodes::Key),
            0xF => Decode::decode(value).map(Opcodes::Misc),
            _ => None,
        };
        decoded.ok_or(OpcodeError::InvalidOpcode(value))
    }
}

/// Represents a step of the program counter
/// this requires the enum ProgramCounterStep
/// to work.
pub trait ProgramCounter {
    /// will move the program counter by the given step.
    fn advance(&mut self, step: ProgramCounterStep);
}

#[derive(Debug, PartialEq, Clone, Copy)]
/// Represents a command from the interpreter up to the host.
pub enum Operation {
    /// If no action has to be taken.
    None,
    /// The program is suspended until a key is pressed.
    Wait,
    /// The framebuffer changed and shall be redrawn.
    Draw,
}

/// These are the traits that have to be full filled for a working opcode
/// table.
///
/// This trait requires the implementation of the [`ProgramCounter`](ProgramCounter)
/// trait, as every handler only reports the step it wants the counter to take.
pub trait ChipOpcodes: ProgramCounter {
    /// will execute a single decoded opcode and move the program counter
    fn calc(&mut self, opcode: &Opcodes) -> Result<Operation, ProcessError> {
        let mut operation = Operation::None;
        let step_op = |(step, op): (ProgramCounterStep, Operation)| {
            operation = op;
            step
        };

        let step = match opcode {
            Opcodes::System(opcode) => self.system(opcode).map(step_op),
            Opcodes::Jump(opcode) => self.jump(opcode),
            Opcodes::Call(opcode) => self.call(opcode),
            Opcodes::SkipEqualConst(opcode) => self.skip_equal_const(opcode),
            Opcodes::SkipNotEqualConst(opcode) => self.skip_not_equal_const(opcode),
            Opcodes::SkipEqualRegister(opcode) => self.skip_equal_register(opcode),
            Opcodes::LoadConst(opcode) => self.load_const(opcode),
            Opcodes::AddConst(opcode) => self.add_const(opcode),
            Opcodes::Arithmetic(opcode) => self.arithmetic(opcode),
            Opcodes::SkipNotEqualRegister(opcode) => self.skip_not_equal_register(opcode),
            Opcodes::LoadIndex(opcode) => self.load_index(opcode),
            Opcodes::JumpOffset(opcode) => self.jump_offset(opcode),
            Opcodes::Random(opcode) => self.random(opcode),
            Opcodes::Draw(opcode) => self.draw(opcode).map(step_op),
            Opcodes::Key(opcode) => self.key(opcode),
            Opcodes::Misc(opcode) => self.misc(opcode).map(step_op),
        }?;

        self.advance(step);
        Ok(operation)
    }

    /// - `00E0` - Display  - `disp_clear()`        - Clears the screen.
    /// - `00EE` - Flow     - `return;`             - Returns from a subroutine.
    fn system(&mut self, opcode: &System) -> Result<(ProgramCounterStep, Operation), ProcessError>;

    /// - `1NNN` - Flow     - `goto NNN;`           - Jumps to address `NNN`.
    fn jump(&self, opcode: &Address) -> Result<ProgramCounterStep, ProcessError>;

    /// - `2NNN` - Flow     - `*(0xNNN)()`          - Calls subroutine at `NNN`.
    fn call(&mut self, opcode: &Address) -> Result<ProgramCounterStep, ProcessError>;

    /// - `3XKK` - Cond     - `if(Vx==KK)`          - Skips the next instruction if `VX` equals `KK`.
    fn skip_equal_const(&self, opcode: &RegisterConst) -> Result<ProgramCounterStep, ProcessError>;

    /// - `4XKK` - Cond     - `if(Vx!=KK)`          - Skips the next instruction if `VX` doesn't equal `KK`.
    fn skip_not_equal_const(
        &self,
        opcode: &RegisterConst,
    ) -> Result<ProgramCounterStep, ProcessError>;

    /// - `5XY0` - Cond     - `if(Vx==Vy)`          - Skips the next instruction if `VX` equals `VY`.
    fn skip_equal_register(&self, opcode: &RegisterPair)
        -> Result<ProgramCounterStep, ProcessError>;

    /// - `6XKK` - Const    - `Vx = KK`             - Sets `VX` to `KK`.
    fn load_const(&mut self, opcode: &RegisterConst) -> Result<ProgramCounterStep, ProcessError>;

    /// - `7XKK` - Const    - `Vx += KK`            - Adds `KK` to `VX`. (Carry flag is not changed)
    fn add_const(&mut self, opcode: &RegisterConst) -> Result<ProgramCounterStep, ProcessError>;

    /// A mutiuse opcode base for type `8XYT` (T is a sub opcode)
    ///
    /// - `8XY0` - Assign   - `Vx=Vy`               - Sets `VX` to the value of `VY`.
    /// - `8XY1` - BitOp    - `Vx=Vx|Vy`            - Sets `VX` to `VX` or `VY`.
    /// - `8XY2` - BitOp    - `Vx=Vx&Vy`            - Sets `VX` to `VX` and `VY`.
    /// - `8XY3` - BitOp    - `Vx=Vx^Vy`            - Sets `VX` to `VX` xor `VY`.
    /// - `8XY4` - Math     - `Vx += Vy`            - Adds `VY` to `VX`. `VF` is set to `1` when there's a carry, and to `0` when there isn't.
    /// - `8XY5` - Math     - `Vx -= Vy`            - `VY` is subtracted from `VX`. `VF` is set to `0` when there's a borrow, and `1` when there isn't.
    /// - `8XY6` - BitOp    - `Vx>>=1`              - Stores the least significant bit of `VX` in `VF` and then shifts `VX` to the right by `1`.
    /// - `8XY7` - Math     - `Vx=Vy-Vx`            - Sets `VX` to `VY` minus `VX`. `VF` is set to `0` when there's a borrow, and `1` when there isn't.
    /// - `8XYE` - BitOp    - `Vx<<=1`              - Stores the most significant bit of `VX` in `VF` and then shifts `VX` to the left by `1`.
    fn arithmetic(&mut self, opcode: &Arithmetic) -> Result<ProgramCounterStep, ProcessError>;

    /// - `9XY0` - Cond     - `if(Vx!=Vy)`          - Skips the next instruction if `VX` doesn't equal `VY`.
    fn skip_not_equal_register(
        &self,
        opcode: &RegisterPair,
    ) -> Result<ProgramCounterStep, ProcessError>;

    /// - `ANNN` - MEM      - `I = NNN`             - Sets `I` to the address `NNN`.
    fn load_index(&mut self, opcode: &Address) -> Result<ProgramCounterStep, ProcessError>;

    /// - `BNNN` - Flow     - `PC=V0+NNN`           - Jumps to the address `NNN` plus `V0`.
    fn jump_offset(&self, opcode: &Address) -> Result<ProgramCounterStep, ProcessError>;

    /// - `CXKK` - Rand     - `Vx=rand()&KK`        - Sets `VX` to a random byte masked with `KK`.
    fn random(&mut self, opcode: &RegisterConst) -> Result<ProgramCounterStep, ProcessError>;

    /// - `DXYN` - Disp     - `draw(Vx,Vy,N)`       - Draws a sprite at coordinate `(VX, VY)` that has a width of `8` pixels and a height of `N` pixels. `VF` is set to `1` if any screen pixels are flipped from set to unset.
    fn draw(&mut self, opcode: &Sprite) -> Result<(ProgramCounterStep, Operation), ProcessError>;

    /// - `EX9E` - KeyOp    - `if(key()==Vx)`       - Skips the next instruction if the key stored in `VX` is pressed.
    /// - `EXA1` - KeyOp    - `if(key()!=Vx)`       - Skips the next instruction if the key stored in `VX` isn't pressed.
    fn key(&self, opcode: &Key) -> Result<ProgramCounterStep, ProcessError>;

    /// - `FX07` - Timer    - `Vx = get_delay()`    - Sets `VX` to the value of the delay timer.
    /// - `FX0A` - KeyOp    - `Vx = get_key()`      - A key press is awaited, and then stored in `VX`.
    /// - `FX15` - Timer    - `delay_timer(Vx)`     - Sets the delay timer to `VX`.
    /// - `FX18` - Sound    - `sound_timer(Vx)`     - Sets the sound timer to `VX`.
    /// - `FX1E` - MEM      - `I +=Vx`              - Adds `VX` to `I`. `VF` is not affected.
    /// - `FX29` - MEM      - `I=sprite_addr[Vx]`   - Sets `I` to the location of the font sprite for `VX`.
    /// - `FX33` - BCD      - `set_BCD(Vx)`         - Stores the hundreds, tens and ones of `VX` at `I`, `I+1` and `I+2`.
    /// - `FX55` - MEM      - `reg_dump(Vx,&I)`     - Stores `V0` to `VX` (including `VX`) in memory starting at address `I`.
    /// - `FX65` - MEM      - `reg_load(Vx,&I)`     - Fills `V0` to `VX` (including `VX`) with values from memory starting at address `I`.
    fn misc(&mut self, opcode: &Misc) -> Result<(ProgramCounterStep, Operation), ProcessError>;
}

#[cfg(test)]
mod tests {
    use std::convert::TryInto;

    use super::*;

    fn decode(value: Opcode) -> Result<Opcodes, OpcodeError> {
        value.try_into()
    }

    #[test]
    fn test_tryfrom_opcode_simple() {
        assert_eq!(decode(0x00E0), Ok(Opcodes::System(System::Clear)));
        assert_eq!(decode(0x00EE), Ok(Opcodes::System(System::Return)));
    }

    #[test]
    fn test_system_is_keyed_by_low_nibble() {
        // only the lowest nibble selects the operation
        assert_eq!(decode(0x0120), Ok(Opcodes::System(System::Clear)));
        assert_eq!(decode(0x034E), Ok(Opcodes::System(System::Return)));
        for n in [0x1, 0x5, 0x9, 0xF] {
            let value = 0x00E0 | n;
            assert_eq!(decode(value), Err(OpcodeError::InvalidOpcode(value)));
        }
    }

    #[test]
    fn test_key_is_keyed_by_low_nibble() {
        let key = |ops| Ok(Opcodes::Key(Key { ops, x: 0x1 }));
        assert_eq!(decode(0xE111), key(KeyOpcode::NotPressed));
        assert_eq!(decode(0xE1F1), key(KeyOpcode::NotPressed));
        assert_eq!(decode(0xE10E), key(KeyOpcode::Pressed));
        assert_eq!(decode(0xE13E), key(KeyOpcode::Pressed));
    }

    #[test]
    fn test_tryfrom_opcode_multiple() {
        let arith = |ops| Ok(Opcodes::Arithmetic(Arithmetic { ops, x: 0x1, y: 0x2 }));
        let misc = |ops| Ok(Opcodes::Misc(Misc { ops, x: 0x3 }));
        let tests = [
            (0x1919, Ok(Opcodes::Jump(Address { nnn: 0x919 }))),
            (0x2222, Ok(Opcodes::Call(Address { nnn: 0x222 }))),
            (
                0x3123,
                Ok(Opcodes::SkipEqualConst(RegisterConst { x: 0x1, kk: 0x23 })),
            ),
            (
                0x4123,
                Ok(Opcodes::SkipNotEqualConst(RegisterConst { x: 0x1, kk: 0x23 })),
            ),
            (
                0x5120,
                Ok(Opcodes::SkipEqualRegister(RegisterPair { x: 0x1, y: 0x2 })),
            ),
            // the low nibble of the 5 family is not part of the key
            (
                0x5121,
                Ok(Opcodes::SkipEqualRegister(RegisterPair { x: 0x1, y: 0x2 })),
            ),
            (
                0x6123,
                Ok(Opcodes::LoadConst(RegisterConst { x: 0x1, kk: 0x23 })),
            ),
            (
                0x7123,
                Ok(Opcodes::AddConst(RegisterConst { x: 0x1, kk: 0x23 })),
            ),
            (0x8120, arith(ArithmeticOpcode::Load)),
            (0x8121, arith(ArithmeticOpcode::Or)),
            (0x8122, arith(ArithmeticOpcode::And)),
            (0x8123, arith(ArithmeticOpcode::Xor)),
            (0x8124, arith(ArithmeticOpcode::Add)),
            (0x8125, arith(ArithmeticOpcode::Sub)),
            (0x8126, arith(ArithmeticOpcode::ShiftRight)),
            (0x8127, arith(ArithmeticOpcode::SubNegated)),
            (0x812E, arith(ArithmeticOpcode::ShiftLeft)),
            (
                0x9120,
                Ok(Opcodes::SkipNotEqualRegister(RegisterPair { x: 0x1, y: 0x2 })),
            ),
            (0xA222, Ok(Opcodes::LoadIndex(Address { nnn: 0x222 }))),
            (0xB222, Ok(Opcodes::JumpOffset(Address { nnn: 0x222 }))),
            (
                0xC123,
                Ok(Opcodes::Random(RegisterConst { x: 0x1, kk: 0x23 })),
            ),
            (
                0xD123,
                Ok(Opcodes::Draw(Sprite {
                    x: 0x1,
                    y: 0x2,
                    n: 0x3,
                })),
            ),
            (
                0xE19E,
                Ok(Opcodes::Key(Key {
                    ops: KeyOpcode::Pressed,
                    x: 0x1,
                })),
            ),
            (
                0xE1A1,
                Ok(Opcodes::Key(Key {
                    ops: KeyOpcode::NotPressed,
                    x: 0x1,
                })),
            ),
            (0xF307, misc(MiscOpcode::GetDelayTimer)),
            (0xF30A, misc(MiscOpcode::AwaitKeyPress)),
            (0xF315, misc(MiscOpcode::SetDelayTimer)),
            (0xF318, misc(MiscOpcode::SetSoundTimer)),
            (0xF31E, misc(MiscOpcode::AddVxToI)),
            (0xF329, misc(MiscOpcode::SetIToSprite)),
            (0xF333, misc(MiscOpcode::StoreBCD)),
            (0xF355, misc(MiscOpcode::StoreV0ToVx)),
            (0xF365, misc(MiscOpcode::FillV0ToVx)),
        ];
        for (value, res) in tests {
            assert_eq!(decode(value), res, "decoding {:#06X}", value);
        }
    }

    #[test]
    fn test_unregistered_secondary_keys() {
        let misses = [0x00E1, 0x8128, 0x812F, 0xE112, 0xE10F, 0xE19F, 0xF0AA, 0xF045, 0xF066];
        for value in misses {
            assert_eq!(decode(value), Err(OpcodeError::InvalidOpcode(value)));
        }
    }

    #[test]
    fn test_every_word_decodes_or_misses() {
        // the decoder is total, it never panics
        for value in 0..=Opcode::MAX {
            match decode(value) {
                Ok(_) => {}
                Err(err) => assert_eq!(err, OpcodeError::InvalidOpcode(value)),
            }
        }
    }

    #[test]
    fn test_build_opcode_out_of_bounds() {
        let data = [0x12, 0x34];
        assert_eq!(build_opcode(&data, 0), Ok(0x1234));
        assert_eq!(
            build_opcode(&data, 1),
            Err(OpcodeError::MemoryInvalid { pointer: 1, len: 2 })
        );
        assert_eq!(
            build_opcode(&data, usize::MAX),
            Err(OpcodeError::MemoryInvalid {
                pointer: usize::MAX,
                len: 2
            })
        );
    }
}
