// SPDX-License-Identifier: MIT OR Apache-2.0

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    Success = 0,
    /// The server answered but did not confirm the operation.
    Unconfirmed = 1,
    FatalError = 2,
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> i32 {
        code as i32
    }
}

impl ExitCode {
    pub fn from_confirmed(confirmed: bool) -> Self {
        if confirmed {
            Self::Success
        } else {
            Self::Unconfirmed
        }
    }
}
