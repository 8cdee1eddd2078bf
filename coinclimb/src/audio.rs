use std::{collections::HashMap, fmt, fs, io::Cursor, path::Path, sync::Arc};

use anyhow::{anyhow, Result};
use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink, Source};

/// Encoded sound data, loaded once and shared by every playback.
#[derive(Clone)]
pub struct SoundHandle {
    name: Arc<str>,
    bytes: Arc<[u8]>,
}

impl SoundHandle {
    /// Wrap already-loaded encoded audio (wav, ogg, mp3, flac).
    pub fn from_bytes(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        let name: String = name.into();
        let bytes: Vec<u8> = bytes.into();
        Self {
            name: Arc::from(name),
            bytes: Arc::from(bytes),
        }
    }

    /// Name the sound was loaded under (its path for file sounds).
    pub fn name(&self) -> &str {
        &self.name
    }

    fn decoder(&self) -> Result<Decoder<Cursor<Arc<[u8]>>>> {
        Decoder::new(Cursor::new(Arc::clone(&self.bytes)))
            .map_err(|e| anyhow!("Failed to decode sound {}: {}", self.name, e))
    }
}

impl fmt::Debug for SoundHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SoundHandle")
            .field("name", &self.name)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Identifies one playback started through [`AudioOutput::play`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PlaybackId(u64);

/// Fire-and-forget playback interface.
///
/// Game logic talks to this trait so it can run without an output device.
pub trait AudioOutput {
    /// Start playing `sound`. Returns `None` when nothing could be played.
    fn play(&mut self, sound: &SoundHandle, volume: f32, looping: bool) -> Option<PlaybackId>;

    /// Stop a playback. Unknown or finished ids are ignored.
    fn stop(&mut self, id: PlaybackId);
}

/// Manages audio playback for sound effects and music.
pub struct AudioSystem {
    _stream: Option<OutputStream>,
    stream_handle: Option<OutputStreamHandle>,
    sinks: HashMap<PlaybackId, Sink>,
    next_playback: u64,
}

impl AudioSystem {
    /// Create a new audio system on the default output device.
    ///
    /// A missing device is not an error: a warning is logged and playback
    /// becomes a no-op.
    pub fn new() -> Result<Self> {
        let (stream, stream_handle) = match OutputStream::try_default() {
            Ok((stream, handle)) => (Some(stream), Some(handle)),
            Err(e) => {
                log::warn!("Failed to initialize audio: {}. Audio will be unavailable.", e);
                (None, None)
            }
        };
        Ok(Self {
            _stream: stream,
            stream_handle,
            sinks: HashMap::new(),
            next_playback: 1,
        })
    }

    /// Check if audio is available and working.
    pub fn is_available(&self) -> bool {
        self.stream_handle.is_some()
    }

    /// Load a sound file and check that it decodes.
    pub fn load<P: AsRef<Path>>(&self, path: P) -> Result<SoundHandle> {
        let path = path.as_ref();
        let bytes = fs::read(path)
            .map_err(|e| anyhow!("Failed to open sound file {:?}: {}", path, e))?;
        let sound = SoundHandle::from_bytes(path.display().to_string(), bytes);
        sound.decoder()?;
        Ok(sound)
    }

    /// Number of playbacks that have not finished yet.
    pub fn active_playbacks(&self) -> usize {
        self.sinks.len()
    }

    fn start(&mut self, sound: &SoundHandle, volume: f32, looping: bool) -> Result<PlaybackId> {
        let stream_handle = self
            .stream_handle
            .as_ref()
            .ok_or_else(|| anyhow!("Audio system is not available"))?;

        let source = sound.decoder()?;
        let sink = Sink::try_new(stream_handle)
            .map_err(|e| anyhow!("Failed to create audio sink: {}", e))?;
        if looping {
            sink.append(source.repeat_infinite());
        } else {
            sink.append(source);
        }
        sink.set_volume(volume.clamp(0.0, 1.0));

        let id = PlaybackId(self.next_playback);
        self.next_playback += 1;
        self.sinks.insert(id, sink);
        Ok(id)
    }

    fn prune_finished(&mut self) {
        self.sinks.retain(|_, sink| !sink.empty());
    }
}

impl AudioOutput for AudioSystem {
    fn play(&mut self, sound: &SoundHandle, volume: f32, looping: bool) -> Option<PlaybackId> {
        if !self.is_available() {
            return None;
        }
        self.prune_finished();
        match self.start(sound, volume, looping) {
            Ok(id) => Some(id),
            Err(e) => {
                log::warn!("{e}");
                None
            }
        }
    }

    fn stop(&mut self, id: PlaybackId) {
        if let Some(sink) = self.sinks.remove(&id) {
            sink.stop();
        }
    }
}
