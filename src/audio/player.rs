//! DY-HV20T command sender.
//!
//! Fire-and-forget: success means the whole frame was handed to the
//! transport.  No acknowledgement is defined by the module, so none is
//! awaited.

use log::{debug, warn};

use super::codec::{self, CMD_PAUSE, CMD_PLAY, CMD_PLAY_TRACK, CMD_STOP};
use super::transport::CommandTransport;
use crate::app::ports::PlayerPort;
use crate::error::PlayerError;

pub struct AudioPlayer<T> {
    transport: T,
}

impl<T: CommandTransport> AudioPlayer<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    /// Play the given 1-based track number.
    pub fn play_track(&mut self, track: u16) -> Result<(), PlayerError> {
        debug!("audio: play track {track}");
        self.send_command(CMD_PLAY_TRACK, &track.to_be_bytes())
    }

    /// Resume after [`pause`](Self::pause).
    pub fn play(&mut self) -> Result<(), PlayerError> {
        self.send_command(CMD_PLAY, &[])
    }

    pub fn pause(&mut self) -> Result<(), PlayerError> {
        self.send_command(CMD_PAUSE, &[])
    }

    pub fn stop(&mut self) -> Result<(), PlayerError> {
        debug!("audio: stop");
        self.send_command(CMD_STOP, &[])
    }

    /// Frame `data` under `cmd` and write it.
    ///
    /// The frame is fully built before the first byte is written; an
    /// oversized payload fails with nothing transmitted.
    pub fn send_command(&mut self, cmd: u8, data: &[u8]) -> Result<(), PlayerError> {
        let frame = codec::encode_frame(cmd, data)?;

        let written = self.transport.write(&frame).map_err(|e| {
            warn!("audio: transport write failed: {e:?}");
            PlayerError::Transport
        })?;
        if written != frame.len() {
            warn!("audio: short write ({written}/{} bytes)", frame.len());
            return Err(PlayerError::Transport);
        }
        self.transport.flush().map_err(|e| {
            warn!("audio: transport flush failed: {e:?}");
            PlayerError::Transport
        })
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn into_inner(self) -> T {
        self.transport
    }
}

impl<T: CommandTransport> PlayerPort for AudioPlayer<T> {
    fn play_track(&mut self, track: u16) -> Result<(), PlayerError> {
        AudioPlayer::play_track(self, track)
    }

    fn stop(&mut self) -> Result<(), PlayerError> {
        AudioPlayer::stop(self)
    }
}
