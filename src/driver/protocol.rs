// src/driver/protocol.rs

use super::Si1132;
use crate::common::{
    command::{Command, ParamIndex},
    diagnostics::{Diagnostic, DiagnosticSink},
    error::Si1132Error,
    hal_traits::{Si1132Bus, Si1132Timer},
    registers::{CMD_NOP, COMMAND, PARAM_RD, PARAM_WR, RESPONSE},
    timing,
};
use nb::Result as NbResult;

// The command register is shared by every operation kind. The only liveness
// signal is the RESPONSE counter: zero after a NOP, then incremented (mod 16)
// by each completed command.
impl<IF, D> Si1132<IF, D>
where
    IF: Si1132Bus + Si1132Timer,
    D: DiagnosticSink,
{
    /// Runs one command through the response handshake and returns the
    /// response counter that acknowledged it.
    ///
    /// `Command::Reset` restarts the counter itself, so it is written without
    /// the handshake and returns 0.
    ///
    /// Low-level access: the driver's own sequencing does not track commands
    /// sent this way.
    pub fn send_command(&mut self, command: Command) -> Result<u8, Si1132Error<IF::Error>> {
        let code = command.code();
        if !command.is_acknowledged() {
            self.write_register(COMMAND, code)?;
            return Ok(0);
        }

        self.drain_response(code)?;
        self.issue_command(code)
    }

    /// Writes `value` to a parameter and verifies it through `PARAM_RD`.
    ///
    /// On a protocol failure the parameter is queried once more for the
    /// diagnostic report only; the write is not retried.
    pub fn set_parameter(&mut self, param: ParamIndex, value: u8) -> Result<(), Si1132Error<IF::Error>> {
        self.write_register(PARAM_WR, value)?;

        match self.send_command(Command::ParamSet(param)) {
            Ok(_) => {}
            Err(e @ Si1132Error::ProtocolTimeout { .. }) => {
                let final_value = self.query_for_report(param);
                self.emit(Diagnostic::ParameterWriteFailed {
                    param: param.as_u8(),
                    requested: value,
                    final_value,
                });
                return Err(e);
            }
            Err(e) => return Err(e),
        }

        let actual = self.read_register(PARAM_RD)?;
        if actual != value {
            self.emit(Diagnostic::ParameterMismatch {
                param: param.as_u8(),
                requested: value,
                actual,
            });
            return Err(Si1132Error::ParameterMismatch {
                param: param.as_u8(),
                requested: value,
                actual,
            });
        }
        Ok(())
    }

    /// Reads a parameter through `PARAM_QUERY` and `PARAM_RD`.
    pub fn read_parameter(&mut self, param: ParamIndex) -> Result<u8, Si1132Error<IF::Error>> {
        if let Err(e) = self.send_command(Command::ParamQuery(param)) {
            self.emit(Diagnostic::ParameterReadFailed { param: param.as_u8() });
            return Err(e);
        }
        self.read_register(PARAM_RD)
    }

    /// Like `read_parameter`, but an unacknowledged query yields 0.
    /// Bus errors and a stuck response counter still propagate.
    pub(super) fn read_parameter_or_zero(&mut self, param: ParamIndex) -> Result<u8, Si1132Error<IF::Error>> {
        match self.read_parameter(param) {
            Err(Si1132Error::ProtocolTimeout { .. }) => Ok(0),
            other => other,
        }
    }

    // --- Handshake ---

    /// NOP until the response counter reads zero. The real command is never
    /// written while a stale non-zero response is pending; giving up yields
    /// `ResponseNotCleared`, distinct from an unacknowledged command.
    fn drain_response(&mut self, command: u8) -> Result<(), Si1132Error<IF::Error>> {
        let mut last_response = 0;
        let drained = self.poll_with_retries(timing::DRAIN_MAX_ATTEMPTS, |drv, attempt| {
            drv.write_register(COMMAND, CMD_NOP).map_err(nb::Error::Other)?;
            if attempt > 0 {
                drv.pause(timing::DRAIN_RETRY_INTERVAL);
            }
            let response = drv.read_register(RESPONSE).map_err(nb::Error::Other)?;
            if response == 0 {
                return Ok(());
            }
            if attempt == 0 {
                drv.emit(Diagnostic::StaleResponse { response });
            }
            last_response = response;
            Err(nb::Error::WouldBlock)
        })?;

        match drained {
            Some(()) => Ok(()),
            None => {
                self.emit(Diagnostic::DrainTimeout { command, response: last_response });
                Err(Si1132Error::ResponseNotCleared { command, response: last_response })
            }
        }
    }

    /// Writes the command and waits for the counter to move off zero,
    /// re-issuing up to `COMMAND_MAX_RETRIES` times.
    fn issue_command(&mut self, command: u8) -> Result<u8, Si1132Error<IF::Error>> {
        let acknowledged = self.poll_with_retries(timing::COMMAND_MAX_RETRIES + 1, |drv, attempt| {
            drv.write_register(COMMAND, command).map_err(nb::Error::Other)?;
            if attempt > 0 {
                drv.pause(timing::COMMAND_RETRY_INTERVAL);
            }
            drv.poll_response()
        })?;

        acknowledged.ok_or_else(|| {
            self.emit(Diagnostic::CommandTimeout { command });
            Si1132Error::ProtocolTimeout { command }
        })
    }

    /// One look at the response counter: `WouldBlock` while it is still zero.
    fn poll_response(&mut self) -> NbResult<u8, Si1132Error<IF::Error>> {
        match self.read_register(RESPONSE)? {
            0 => Err(nb::Error::WouldBlock),
            response => Ok(response),
        }
    }

    /// Best-effort PARAM_QUERY used only to enrich a failure report.
    fn query_for_report(&mut self, param: ParamIndex) -> Option<u8> {
        self.send_command(Command::ParamQuery(param)).ok()?;
        self.read_register(PARAM_RD).ok()
    }
}
