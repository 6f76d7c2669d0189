//! Interactive waveform session
//!
//! One pass of the generator asks for an audio file and the render
//! parameters, reduces the stream, writes the PNG and persists the
//! parameters. After a successful pass the operator may draw again from the
//! same file. The session ends when input runs out.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use thiserror::Error;
use wavebar_core::raster::{Rgba, DEFAULT_BAR_COLOR};
use wavebar_core::{
    save_png, ParameterStore, PeakStrategy, SampleReducer, SourceOpener, StreamInfo,
    WaveformParameters, WaveformRasterizer,
};

use crate::console::Console;
use crate::prompt::{Prompt, PromptEvent, StrategyChoice, LAST_COMMAND};

const LOCATION_PROMPT: &str =
    "Specify the location of the audio file (drag and drop -> enter also works): ";
const REPEAT_PROMPT: &str = "Do you wish to draw a waveform using the same audio file again? (y/n) ";

/// State carried between generator passes
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    /// Parameters of the last successful render
    pub last: Option<WaveformParameters>,
}

#[derive(Error, Debug)]
enum SessionError {
    #[error("Input closed")]
    InputClosed,

    #[error(transparent)]
    Io(#[from] io::Error),
}

pub struct Session<O, R, W> {
    console: Console<R, W>,
    opener: O,
    store: ParameterStore,
    output_path: PathBuf,
    bar_color: Rgba<u8>,
    state: SessionState,
}

impl<O, R, W> Session<O, R, W>
where
    O: SourceOpener,
    R: BufRead,
    W: Write,
{
    pub fn new(
        console: Console<R, W>,
        opener: O,
        store: ParameterStore,
        output_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            console,
            opener,
            store,
            output_path: output_path.into(),
            bar_color: DEFAULT_BAR_COLOR,
            state: SessionState::default(),
        }
    }

    pub fn with_bar_color(mut self, color: Rgba<u8>) -> Self {
        self.bar_color = color;
        self
    }

    /// Start with previously persisted parameters
    pub fn with_last(mut self, last: Option<WaveformParameters>) -> Self {
        self.state.last = last;
        self
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn console(&self) -> &Console<R, W> {
        &self.console
    }

    /// Run until input is exhausted
    ///
    /// `initial` is tried as the audio location of the first pass.
    pub fn run(&mut self, initial: Option<PathBuf>) -> io::Result<()> {
        match self.run_passes(initial) {
            Ok(()) | Err(SessionError::InputClosed) => {
                log::debug!("session: input closed");
                Ok(())
            }
            Err(SessionError::Io(e)) => Err(e),
        }
    }

    fn run_passes(&mut self, initial: Option<PathBuf>) -> Result<(), SessionError> {
        self.banner()?;
        let mut location = initial;

        loop {
            if self.run_generator(location.take())? && self.ask(Prompt::yes_no(REPEAT_PROMPT))? {
                location = self.state.last.as_ref().map(|p| p.audio_location.clone());
                continue;
            }
            self.banner()?;
        }
    }

    /// One generator pass, `true` if an image was written
    fn run_generator(&mut self, location: Option<PathBuf>) -> Result<bool, SessionError> {
        let mut candidate = location;
        let (audio_location, mut source) = loop {
            let path = match candidate.take() {
                Some(path) => path,
                None => self.ask(Prompt::path(LOCATION_PROMPT))?,
            };
            if !path.is_file() {
                self.console.error("Not a valid file!")?;
                continue;
            }
            match self.opener.open_source(&path) {
                Ok(source) => break (path, source),
                Err(e) => {
                    log::warn!("run_generator: failed to open {:?}: {}", path, e);
                    self.console.error("An error occurred while creating the audio stream:")?;
                    self.console.error(&e)?;
                }
            }
        };

        self.console.highlight(" OK ")?;
        let info = *source.info();
        self.show_stream_info(&info)?;

        let block_size = self.ask(Prompt::positive_int("Set Block Size: "))?;
        let space_size = self.ask(Prompt::non_negative_int("Set Space Size: "))?;
        let image_width = self.ask(Prompt::positive_int("Set Image Width: "))?;
        let peak_height = self.ask(Prompt::positive_int("Set Peak Height: "))?;

        self.console.line("Choose a Peak Calculation Method:")?;
        self.console.highlight("1: Scaled Average")?;
        self.console.highlight("2: Absolute Peak")?;
        let strategy = match self.ask(Prompt::strategy("Method: "))? {
            StrategyChoice::ScaledAverage => PeakStrategy::ScaledAverage {
                scale: self.ask(Prompt::scale("Scale: "))?,
            },
            StrategyChoice::AbsolutePeak => PeakStrategy::AbsolutePeak,
        };

        let params = WaveformParameters {
            audio_location,
            block_size,
            space_size,
            image_width,
            peak_height,
            strategy,
        };

        if let Err(e) = params.validate() {
            self.console.error(format!("Invalid parameters: {}", e))?;
            return Ok(false);
        }

        let reduction = SampleReducer::for_params(&params, info.total_samples).reduce(&mut source);
        if let Some(e) = &reduction.read_error {
            self.console.highlight(format!(
                "Reading stopped early after {} bars: {}",
                reduction.values.len(),
                e
            ))?;
        }

        let image = WaveformRasterizer::for_params(&params)
            .with_color(self.bar_color)
            .render(&reduction.values);
        if let Err(e) = save_png(&image, &self.output_path) {
            self.console.error(&e)?;
            return Ok(false);
        }
        self.console
            .highlight(format!("Image saved to {}", self.output_path.display()))?;

        if let Err(e) = self.store.save(Some(&params)) {
            self.console.error(format!("Failed to save parameters: {}", e))?;
        }
        self.state.last = Some(params);
        Ok(true)
    }

    /// Ask until the prompt accepts a line
    fn ask<T>(&mut self, mut prompt: Prompt<T>) -> Result<T, SessionError> {
        loop {
            self.console.prompt(prompt.label())?;
            let line = self.console.read_line()?.ok_or(SessionError::InputClosed)?;
            match prompt.feed(&line) {
                PromptEvent::Accepted(value) => return Ok(value),
                PromptEvent::ShowLast => self.show_last()?,
                PromptEvent::Empty => {}
                PromptEvent::Rejected(e) => self.console.error(&e)?,
            }
        }
    }

    fn show_last(&mut self) -> io::Result<()> {
        match &self.state.last {
            Some(params) => self.console.notice(format!("\nLast parameters:\n{}", params)),
            None => self.console.notice("There are no previously saved parameters."),
        }
    }

    fn show_stream_info(&mut self, info: &StreamInfo) -> io::Result<()> {
        let length = match info.duration() {
            Some(duration) => {
                let secs = duration.as_secs();
                format!("Length: {} bytes ({}m{}s)", info.byte_len(), secs / 60, secs % 60)
            }
            None => format!("Length: {} bytes", info.byte_len()),
        };
        self.console.notice(length)?;
        self.console
            .notice(format!("Bits Per Sample: {}", info.resolution))
    }

    fn banner(&mut self) -> io::Result<()> {
        self.console.line("")?;
        self.console
            .highlight(format!(" wavebar {} ", env!("CARGO_PKG_VERSION")))?;
        self.console.line("Available commands:")?;
        self.console.line(format!(
            "{} : show last parameter values that were used",
            LAST_COMMAND
        ))?;
        self.console.line("")
    }
}
