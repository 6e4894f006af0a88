//! Program listings: one directive per line, the first character picking the
//! kind and the rest an octal value.
//!
//! ```text
//! @1000     set the load address
//! -012700   store a word there, then advance by 2
//! *1000     set the entry PC
//! ```

use common::asm::Reg;
use common::constants::WORD_SIZE;

use crate::address_space::AddressSpace;
use crate::error::LoadError;

use log::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Directive {
    SetOrigin(u16),
    StoreWord(u16),
    SetEntry(u16),
}

impl Directive {
    fn parse_value(line: usize, text: &str) -> Result<u16, LoadError> {
        if text.is_empty() || !text.bytes().all(|b| (b'0'..=b'7').contains(&b)) {
            return Err(LoadError::NotOctal{line, text: text.to_owned()});
        }
        u16::from_str_radix(text, 8)
            .map_err(|source| LoadError::BadValue{line, text: text.to_owned(), source})
    }

    /// Parses one line. `line` is 1-based and only used for errors. Blank
    /// lines yield `None`.
    pub fn parse_line(line: usize, text: &str) -> Result<Option<Directive>, LoadError> {
        let text = text.trim();
        let mut chars = text.chars();
        let Some(kind) = chars.next() else {
            return Ok(None);
        };
        let directive = match kind {
            '@' => Directive::SetOrigin(Self::parse_value(line, chars.as_str())?),
            '-' => Directive::StoreWord(Self::parse_value(line, chars.as_str())?),
            '*' => Directive::SetEntry(Self::parse_value(line, chars.as_str())?),
            _ => return Err(LoadError::UnknownDirective{line, text: text.to_owned()}),
        };
        Ok(Some(directive))
    }
}

pub fn parse_listing(listing: &str) -> Result<Vec<Directive>, LoadError> {
    let mut directives = Vec::new();
    for (idx, text) in listing.lines().enumerate() {
        if let Some(directive) = Directive::parse_line(idx + 1, text)? {
            directives.push(directive);
        }
    }
    if directives.is_empty() {
        return Err(LoadError::Empty);
    }
    Ok(directives)
}

impl AddressSpace {
    /// Initializes memory and the PC from directives. Nothing is traced.
    pub fn load_image(&mut self, directives: &[Directive]) {
        let mut origin = 0u16;
        for directive in directives {
            match *directive {
                Directive::SetOrigin(addr) => origin = addr,
                Directive::StoreWord(val) => {
                    self.poke_word(origin, val);
                    origin = origin.wrapping_add(WORD_SIZE);
                },
                Directive::SetEntry(pc) => self.reg_write_word(Reg::PC, pc),
            }
        }
        debug!("Loaded {} directives, entry 0o{:o}", directives.len(), self.pc());
    }
}
