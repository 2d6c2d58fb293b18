//! The pull-based replay-body driver.
//!
//! [`ReplayBody`] borrows a decompressed body buffer and walks it one
//! frame per [`step`](ReplayBody::step). Every frame updates the
//! [`SessionState`] before it is handed out, so the state observed between
//! two steps always reflects exactly the frames already yielded.

use fafreplay_core::{
    decode_payload, next_frame, resolve_type, Command, CommandType, Cursor, ParseError, RawFrame,
    Tick, FRAME_HEADER_LEN,
};

use crate::config::BodyConfig;
use crate::state::{BodyEntry, SessionState};

/// Why a pass over the body ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BodyEnd {
    /// Fewer than a frame header's worth of bytes remained.
    Exhausted,
    /// A desync was detected with `stop_on_desync` set.
    Desync {
        /// The tick at which the desync was detected.
        tick: Tick,
    },
    /// A frame or payload error aborted the pass.
    Aborted,
}

/// One processed frame.
#[derive(Clone, Debug, PartialEq)]
pub struct BodyEvent<'a> {
    /// Session tick after the frame was applied.
    pub tick: Tick,
    /// The frame's command type.
    pub command_type: CommandType,
    /// The frame as it appears in the body buffer.
    pub raw: RawFrame<'a>,
    /// The decoded command, if its type is selected.
    pub command: Option<Command>,
}

/// Outcome of a single [`ReplayBody::step`].
#[derive(Clone, Debug, PartialEq)]
pub enum Step<'a> {
    /// A frame was processed.
    Event(BodyEvent<'a>),
    /// The pass is over. Further steps return the same value.
    End(BodyEnd),
}

/// Single-pass engine over a replay body buffer.
///
/// Either drive it with [`step`](Self::step), or use it as an
/// [`Iterator`] of events; the iterator stops after the end or the first
/// error, and [`end`](Self::end) then says which it was.
pub struct ReplayBody<'a> {
    cursor: Cursor<'a>,
    config: BodyConfig,
    state: SessionState,
    end: Option<BodyEnd>,
    frames_read: u64,
}

impl<'a> ReplayBody<'a> {
    /// Start a pass over `data`, which begins at the first body frame.
    pub fn new(data: &'a [u8], config: BodyConfig) -> Self {
        let state = SessionState::new(config.store_body);
        Self {
            cursor: Cursor::new(data),
            config,
            state,
            end: None,
            frames_read: 0,
        }
    }

    /// The configuration this pass runs with.
    pub fn config(&self) -> &BodyConfig {
        &self.config
    }

    /// Bookkeeping accumulated so far.
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Consume the engine, keeping its bookkeeping.
    pub fn into_state(self) -> SessionState {
        self.state
    }

    /// Why the pass ended, or `None` while it is still running.
    pub fn end(&self) -> Option<BodyEnd> {
        self.end
    }

    /// Number of frames processed so far.
    pub fn frames_read(&self) -> u64 {
        self.frames_read
    }

    /// Byte offset of the next frame in the body buffer.
    pub fn offset(&self) -> usize {
        self.cursor.offset()
    }

    /// Process the next frame.
    ///
    /// An error aborts the pass: it is returned once, and every later step
    /// returns [`Step::End`] with [`BodyEnd::Aborted`].
    pub fn step(&mut self) -> Result<Step<'a>, ParseError> {
        if let Some(end) = self.end {
            return Ok(Step::End(end));
        }
        if self.cursor.remaining() < FRAME_HEADER_LEN {
            return Ok(Step::End(self.finish(BodyEnd::Exhausted)));
        }
        match self.process_frame() {
            Ok(step) => Ok(step),
            Err(err) => {
                tracing::debug!(offset = self.cursor.offset(), error = %err, "body pass aborted");
                self.end = Some(BodyEnd::Aborted);
                Err(err)
            }
        }
    }

    /// Drain the body, returning the final bookkeeping and how it ended.
    pub fn run(mut self) -> Result<(SessionState, BodyEnd), ParseError> {
        loop {
            if let Step::End(end) = self.step()? {
                return Ok((self.state, end));
            }
        }
    }

    fn process_frame(&mut self) -> Result<Step<'a>, ParseError> {
        let raw = next_frame(&mut self.cursor)?;
        let command_type = resolve_type(&raw)?;
        self.frames_read += 1;
        tracing::trace!(
            offset = raw.offset(),
            command = %command_type,
            len = raw.len(),
            "frame"
        );

        if !self.config.decodes(command_type) {
            if self.state.stores_body() {
                self.state
                    .record(command_type, BodyEntry::Raw(raw.bytes().to_vec()));
            }
            return Ok(Step::Event(BodyEvent {
                tick: self.state.tick(),
                command_type,
                raw,
                command: None,
            }));
        }

        let command = decode_payload(command_type, &mut raw.payload_cursor())?;
        let desync = self.state.apply(&command);
        if self.state.stores_body() {
            self.state
                .record(command_type, BodyEntry::Decoded(command.clone()));
        }
        if let Some(tick) = desync {
            if self.config.stop_on_desync {
                return Ok(Step::End(self.finish(BodyEnd::Desync { tick })));
            }
        }

        let command = self.config.surfaces(command_type).then_some(command);
        Ok(Step::Event(BodyEvent {
            tick: self.state.tick(),
            command_type,
            raw,
            command,
        }))
    }

    fn finish(&mut self, end: BodyEnd) -> BodyEnd {
        tracing::debug!(
            ?end,
            frames = self.frames_read,
            tick = %self.state.tick(),
            desyncs = self.state.desync_ticks().len(),
            "body pass finished"
        );
        self.end = Some(end);
        end
    }
}

impl<'a> Iterator for ReplayBody<'a> {
    type Item = Result<BodyEvent<'a>, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.end.is_some() {
            return None;
        }
        match self.step() {
            Ok(Step::Event(event)) => Some(Ok(event)),
            Ok(Step::End(_)) => None,
            Err(err) => Some(Err(err)),
        }
    }
}

impl std::iter::FusedIterator for ReplayBody<'_> {}

#[cfg(test)]
mod tests {
    use super::*;
    use fafreplay_core::{CommandSource, PlayerId};
    use fafreplay_test_utils::BodyBuilder;

    #[test]
    fn empty_and_short_buffers_end_cleanly() {
        for len in 0..FRAME_HEADER_LEN {
            let data = vec![0u8; len];
            let mut body = ReplayBody::new(&data, BodyConfig::default());
            assert_eq!(body.step().unwrap(), Step::End(BodyEnd::Exhausted));
            assert_eq!(body.frames_read(), 0);
        }
    }

    #[test]
    fn end_is_sticky() {
        let data = BodyBuilder::new().advance(1).build();
        let mut body = ReplayBody::new(&data, BodyConfig::default());
        assert!(matches!(body.step().unwrap(), Step::Event(_)));
        assert_eq!(body.step().unwrap(), Step::End(BodyEnd::Exhausted));
        assert_eq!(body.step().unwrap(), Step::End(BodyEnd::Exhausted));
        assert_eq!(body.end(), Some(BodyEnd::Exhausted));
    }

    #[test]
    fn event_tick_includes_the_frames_own_advance() {
        let data = BodyBuilder::new().advance(4).build();
        let mut body = ReplayBody::new(&data, BodyConfig::default());
        let Step::Event(event) = body.step().unwrap() else {
            panic!("expected an event");
        };
        assert_eq!(event.tick, Tick(4));
        assert_eq!(event.command, Some(Command::Advance { delta: 4 }));
        assert_eq!(event.raw.bytes(), data.as_slice());
    }

    #[test]
    fn error_aborts_and_fuses_the_iterator() {
        let data = BodyBuilder::new().advance(1).raw(0x40, &[]).advance(1).build();
        let mut body = ReplayBody::new(&data, BodyConfig::default());
        assert!(body.next().unwrap().is_ok());
        assert!(matches!(
            body.next(),
            Some(Err(ParseError::UnknownCommandType {
                command_type: 0x40,
                ..
            }))
        ));
        assert!(body.next().is_none());
        assert_eq!(body.end(), Some(BodyEnd::Aborted));
        assert_eq!(body.state().tick(), Tick(1));
    }

    #[test]
    fn unselected_frames_are_recorded_raw() {
        let data = BodyBuilder::new()
            .set_command_source(1)
            .empty(CommandType::RequestPause)
            .build();
        let config = BodyConfig {
            selected: [CommandType::EndGame].into_iter().collect(),
            store_body: true,
            ..Default::default()
        };
        let (state, _) = ReplayBody::new(&data, config).run().unwrap();
        let group = &state.current_tick_commands()[&CommandSource::Player(PlayerId(1))];
        assert_eq!(
            group[&CommandType::RequestPause],
            BodyEntry::Raw(vec![CommandType::RequestPause.id(), 3, 0])
        );
        assert!(matches!(
            group[&CommandType::SetCommandSource],
            BodyEntry::Decoded(Command::SetCommandSource { .. })
        ));
    }

    #[test]
    fn offset_tracks_consumed_frames() {
        let data = BodyBuilder::new().advance(1).advance(1).build();
        let mut body = ReplayBody::new(&data, BodyConfig::default());
        body.step().unwrap();
        assert_eq!(body.offset(), 7);
        body.step().unwrap();
        assert_eq!(body.offset(), 14);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        #[derive(Clone, Debug)]
        enum Op {
            Advance(u32),
            Source(u8),
            Terminate,
            Pause,
        }

        fn arb_op() -> impl Strategy<Value = Op> {
            prop_oneof![
                (0u32..1000).prop_map(Op::Advance),
                (0u8..8).prop_map(Op::Source),
                Just(Op::Terminate),
                Just(Op::Pause),
            ]
        }

        fn build(ops: &[Op]) -> Vec<u8> {
            ops.iter().fold(BodyBuilder::new(), |b, op| match op {
                Op::Advance(d) => b.advance(*d),
                Op::Source(p) => b.set_command_source(*p),
                Op::Terminate => b.command_source_terminated(),
                Op::Pause => b.empty(CommandType::RequestPause),
            })
            .build()
        }

        proptest! {
            #[test]
            fn arbitrary_bytes_never_panic(data in prop::collection::vec(any::<u8>(), 0..512)) {
                let mut body = ReplayBody::new(&data, BodyConfig::default());
                for _ in body.by_ref() {}
                prop_assert!(body.end().is_some());
                prop_assert!(body.offset() <= data.len());
            }

            #[test]
            fn final_tick_is_the_sum_of_advances(ops in prop::collection::vec(arb_op(), 0..64)) {
                let data = build(&ops);
                let expected: u64 = ops
                    .iter()
                    .map(|op| match op {
                        Op::Advance(d) => u64::from(*d),
                        _ => 0,
                    })
                    .sum();

                let mut body = ReplayBody::new(&data, BodyConfig::default());
                let mut last = Tick(0);
                for event in body.by_ref() {
                    let event = event.unwrap();
                    prop_assert!(event.tick >= last);
                    last = event.tick;
                }
                prop_assert_eq!(body.end(), Some(BodyEnd::Exhausted));
                prop_assert_eq!(body.frames_read(), ops.len() as u64);
                prop_assert_eq!(body.state().tick(), Tick(expected));
            }

            #[test]
            fn store_body_never_changes_bookkeeping(ops in prop::collection::vec(arb_op(), 0..64)) {
                let data = build(&ops);
                let (plain, _) = ReplayBody::new(&data, BodyConfig::default()).run().unwrap();
                let config = BodyConfig { store_body: true, ..Default::default() };
                let (stored, _) = ReplayBody::new(&data, config).run().unwrap();
                prop_assert_eq!(plain.tick(), stored.tick());
                prop_assert_eq!(plain.last_tick_by_player(), stored.last_tick_by_player());
            }
        }
    }
}
