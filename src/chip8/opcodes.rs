use rand::RngCore;

use crate::{
    definitions::{cpu, display},
    opcode::{
        Address, Arithmetic, ArithmeticOpcode, ChipOpcodes, Key, KeyOpcode, Misc, MiscOpcode,
        Operation, ProgramCounterStep, RegisterConst, RegisterPair, Sprite, System,
    },
    ProcessError,
};

use super::ChipSet;

impl ChipOpcodes for ChipSet {
    fn system(&mut self, opcode: &System) -> Result<(ProgramCounterStep, Operation), ProcessError> {
        match opcode {
            System::Clear => {
                // 00E0
                // clear display
                for row in self.display.iter_mut() {
                    row.fill(false);
                }
                Ok((ProgramCounterStep::Next, Operation::Draw))
            }
            System::Return => {
                // 00EE
                // Return from sub routine => pop from stack
                let pc = self.pop_stack()?;
                log::debug!("return to {:#06X}", pc);
                Ok((ProgramCounterStep::Jump(pc), Operation::None))
            }
        }
    }

    fn jump(&self, opcode: &Address) -> Result<ProgramCounterStep, ProcessError> {
        // 1NNN
        Ok(ProgramCounterStep::Jump(opcode.nnn))
    }

    fn call(&mut self, opcode: &Address) -> Result<ProgramCounterStep, ProcessError> {
        // 2NNN
        // the return address is the opcode after the call
        self.push_stack(ProgramCounterStep::Next.apply(self.program_counter))?;
        Ok(ProgramCounterStep::Jump(opcode.nnn))
    }

    fn skip_equal_const(&self, opcode: &RegisterConst) -> Result<ProgramCounterStep, ProcessError> {
        // 3XKK
        Ok(ProgramCounterStep::cond(self.registers[opcode.x] == opcode.kk))
    }

    fn skip_not_equal_const(
        &self,
        opcode: &RegisterConst,
    ) -> Result<ProgramCounterStep, ProcessError> {
        // 4XKK
        Ok(ProgramCounterStep::cond(self.registers[opcode.x] != opcode.kk))
    }

    fn skip_equal_register(
        &self,
        opcode: &RegisterPair,
    ) -> Result<ProgramCounterStep, ProcessError> {
        // 5XY_
        Ok(ProgramCounterStep::cond(
            self.registers[opcode.x] == self.registers[opcode.y],
        ))
    }

    fn load_const(&mut self, opcode: &RegisterConst) -> Result<ProgramCounterStep, ProcessError> {
        // 6XKK
        self.registers[opcode.x] = opcode.kk;
        Ok(ProgramCounterStep::Next)
    }

    fn add_const(&mut self, opcode: &RegisterConst) -> Result<ProgramCounterStep, ProcessError> {
        // 7XKK
        // let VX overflow, but ignore carry
        self.registers[opcode.x] = self.registers[opcode.x].wrapping_add(opcode.kk);
        Ok(ProgramCounterStep::Next)
    }

    fn arithmetic(&mut self, opcode: &Arithmetic) -> Result<ProgramCounterStep, ProcessError> {
        let Arithmetic { ops, x, y } = *opcode;
        let (vx, vy) = (self.registers[x], self.registers[y]);

        // VF is written last
        let flag = match ops {
            ArithmeticOpcode::Load => {
                self.registers[x] = vy;
                None
            }
            ArithmeticOpcode::Or => {
                self.registers[x] = vx | vy;
                None
            }
            ArithmeticOpcode::And => {
                self.registers[x] = vx & vy;
                None
            }
            ArithmeticOpcode::Xor => {
                self.registers[x] = vx ^ vy;
                None
            }
            ArithmeticOpcode::Add => {
                let (res, carry) = vx.overflowing_add(vy);
                self.registers[x] = res;
                Some(carry as u8)
            }
            ArithmeticOpcode::Sub => {
                self.registers[x] = vx.wrapping_sub(vy);
                Some((vx >= vy) as u8)
            }
            ArithmeticOpcode::ShiftRight => {
                // Vy is ignored
                self.registers[x] = vx >> 1;
                Some(vx & 0x01)
            }
            ArithmeticOpcode::SubNegated => {
                self.registers[x] = vy.wrapping_sub(vx);
                Some((vy >= vx) as u8)
            }
            ArithmeticOpcode::ShiftLeft => {
                self.registers[x] = vx << 1;
                Some(vx >> 7)
            }
        };

        if let Some(flag) = flag {
            self.registers[cpu::register::LAST] = flag;
        }

        Ok(ProgramCounterStep::Next)
    }

    fn skip_not_equal_register(
        &self,
        opcode: &RegisterPair,
    ) -> Result<ProgramCounterStep, ProcessError> {
        // 9XY_
        Ok(ProgramCounterStep::cond(
            self.registers[opcode.x] != self.registers[opcode.y],
        ))
    }

    fn load_index(&mut self, opcode: &Address) -> Result<ProgramCounterStep, ProcessError> {
        // ANNN
        self.index_register = opcode.nnn as u16;
        Ok(ProgramCounterStep::Next)
    }

    fn jump_offset(&self, opcode: &Address) -> Result<ProgramCounterStep, ProcessError> {
        // BNNN
        Ok(ProgramCounterStep::Jump(
            opcode.nnn + self.registers[0] as usize,
        ))
    }

    fn random(&mut self, opcode: &RegisterConst) -> Result<ProgramCounterStep, ProcessError> {
        // CXKK
        let mut random = [0u8; 1];
        self.rng.fill_bytes(&mut random);
        self.registers[opcode.x] = random[0] & opcode.kk;
        Ok(ProgramCounterStep::Next)
    }

    fn draw(&mut self, opcode: &Sprite) -> Result<(ProgramCounterStep, Operation), ProcessError> {
        // DXYN
        // the origin wraps around the screen, the sprite itself is clipped
        let origin_x = self.registers[opcode.x] as usize % display::WIDTH;
        let origin_y = self.registers[opcode.y] as usize % display::HEIGHT;
        let range = self.memory_range(self.index_register as usize, opcode.n)?;

        let mut collision = false;
        for (row, sprite) in self.memory[range].iter().enumerate() {
            let y = origin_y + row;
            if y >= display::HEIGHT {
                break;
            }

            for column in 0..display::SPRITE_WIDTH {
                let x = origin_x + column;
                if x >= display::WIDTH {
                    break;
                }
                if *sprite & (0x80u8 >> column) == 0 {
                    continue;
                }

                let pixel = &mut self.display[y][x];
                collision |= *pixel;
                *pixel = !*pixel;
            }
        }

        self.registers[cpu::register::LAST] = collision as u8;
        Ok((ProgramCounterStep::Next, Operation::Draw))
    }

    fn key(&self, opcode: &Key) -> Result<ProgramCounterStep, ProcessError> {
        let pressed = self.keyboard.is_pressed(self.registers[opcode.x] as usize);
        let skip = match opcode.ops {
            // EX9E
            KeyOpcode::Pressed => pressed,
            // EXA1
            KeyOpcode::NotPressed => !pressed,
        };
        Ok(ProgramCounterStep::cond(skip))
    }

    fn misc(&mut self, opcode: &Misc) -> Result<(ProgramCounterStep, Operation), ProcessError> {
        let x = opcode.x;
        let mut operation = Operation::None;

        match opcode.ops {
            MiscOpcode::GetDelayTimer => {
                // FX07
                self.registers[x] = self.delay_timer.get_value();
            }
            MiscOpcode::AwaitKeyPress => {
                // FX0A
                // a key that is already down is taken right away, otherwise
                // the chip suspends until the host reports one
                match self.keyboard.first_pressed() {
                    Some(key) => self.registers[x] = key as u8,
                    None => {
                        log::debug!("waiting for a key press into V{:X}", x);
                        self.awaiting_key = Some(x);
                        operation = Operation::Wait;
                    }
                }
            }
            MiscOpcode::SetDelayTimer => {
                // FX15
                self.delay_timer.set_value(self.registers[x]);
            }
            MiscOpcode::SetSoundTimer => {
                // FX18
                self.sound_timer.set_value(self.registers[x]);
            }
            MiscOpcode::AddVxToI => {
                // FX1E
                // VF is not affected
                self.index_register = self
                    .index_register
                    .wrapping_add(self.registers[x] as u16);
            }
            MiscOpcode::SetIToSprite => {
                // FX29
                let location = display::fontset::LOCATION
                    + display::fontset::CHARACTER_SIZE * self.registers[x] as usize;
                self.index_register = location as u16;
            }
            MiscOpcode::StoreBCD => {
                // FX33
                let range = self.memory_range(self.index_register as usize, 3)?;
                let value = self.registers[x];
                self.memory[range].copy_from_slice(&[value / 100, (value / 10) % 10, value % 10]);
            }
            MiscOpcode::StoreV0ToVx => {
                // FX55
                // I is left unchanged
                let range = self.memory_range(self.index_register as usize, x + 1)?;
                self.memory[range].copy_from_slice(&self.registers[..=x]);
            }
            MiscOpcode::FillV0ToVx => {
                // FX65
                // I is left unchanged
                let range = self.memory_range(self.index_register as usize, x + 1)?;
                self.registers[..=x].copy_from_slice(&self.memory[range]);
            }
        }

        Ok((ProgramCounterStep::Next, operation))
    }
}
