//! Modifier-combo translation for keyboard devices
//!
//! Holding the designated modifier key `M` together with a mapped key rewrites
//! that key into its "shifted" counterpart. Tapping `M` on its own still
//! produces a normal down/up pulse for `M`.
//!
//! # State Machine
//!
//! ```text
//!            down(M), no pair held
//!   Idle ───────────────────────────► Pending
//!    │ ▲                                 │
//!    │ └──────── up(M): pulse M ─────────┤
//!    │                                   │ mapped key
//!    │ down(M), pair held                ▼
//!    └─────────────────────────────►  Active
//!      ◄──── up(M): revert out keys ────┘
//! ```
//!
//! Translation runs on a snapshot of the device key table, so rewrites made
//! earlier in a pass are visible to later events of the same pass.

use crate::controller::event_queue::{EventMask, EventQueue, RawEvent};
use crate::controller::key_state::KeyStateTable;
use crate::controller::keycode::KeyCode;
use std::collections::VecDeque;
use tracing::{debug, trace};

/// Events taken from the queue per translation batch
pub const TRANSLATE_BATCH: usize = 10;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ModifierState {
    /// No chord in progress
    #[default]
    Idle,
    /// Modifier held, chord not yet determined
    Pending,
    /// Chord engaged, mapped keys are rewritten
    Active,
}

/// One `in_key -> out_key` rewrite rule
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ModifierPair {
    pub in_key: KeyCode,
    pub out_key: KeyCode,
}

impl ModifierPair {
    pub fn new(in_key: KeyCode, out_key: KeyCode) -> Self {
        Self { in_key, out_key }
    }
}

/// Ordered rewrite rules with a bound flag per rule
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ModifierMap {
    pairs: Vec<ModifierPair>,
    bound: Vec<bool>,
}

impl ModifierMap {
    pub fn new(pairs: Vec<ModifierPair>) -> Self {
        let bound = vec![false; pairs.len()];
        Self { pairs, bound }
    }

    pub fn pairs(&self) -> &[ModifierPair] {
        &self.pairs
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn is_bound(&self, index: usize) -> bool {
        self.bound.get(index).copied().unwrap_or(false)
    }

    pub fn set_bound(&mut self, index: usize, bound: bool) {
        if let Some(flag) = self.bound.get_mut(index) {
            *flag = bound;
        }
    }

    pub fn any_bound(&self) -> bool {
        self.bound.iter().any(|b| *b)
    }

    pub fn iter(&self) -> impl Iterator<Item = (ModifierPair, bool)> + '_ {
        self.pairs.iter().copied().zip(self.bound.iter().copied())
    }
}

/// Working data of one translation pass
#[derive(Debug)]
pub struct TranslatePass<'a> {
    /// Private copy of the device key table
    pub snapshot: KeyStateTable,
    /// Translated events, in emission order
    pub out: Vec<RawEvent>,
    emu_keys: &'a KeyStateTable,
    allow_unbound: bool,
}

impl<'a> TranslatePass<'a> {
    pub fn new(keys: &KeyStateTable, emu_keys: &'a KeyStateTable, allow_unbound: bool) -> Self {
        Self {
            snapshot: keys.clone(),
            out: Vec::new(),
            emu_keys,
            allow_unbound,
        }
    }

    fn emit(&mut self, code: KeyCode, pressed: bool) {
        self.snapshot.set(code, pressed);
        self.out.push(RawEvent::key(code, pressed));
    }

    // up(up_key) immediately followed by down(down_key)
    fn switch_key(&mut self, up_key: KeyCode, down_key: KeyCode) {
        self.emit(up_key, false);
        self.emit(down_key, true);
    }
}

#[derive(Clone, Debug)]
pub struct ModifierTranslator {
    modifier: KeyCode,
    map: ModifierMap,
    state: ModifierState,
    delayed_key: Option<KeyCode>,
    // Translator output not yet collected, never translated again
    translated: VecDeque<RawEvent>,
}

impl ModifierTranslator {
    pub fn new(modifier: KeyCode, map: ModifierMap) -> Self {
        Self {
            modifier,
            map,
            state: ModifierState::Idle,
            delayed_key: None,
            translated: VecDeque::new(),
        }
    }

    pub fn modifier(&self) -> KeyCode {
        self.modifier
    }

    pub fn state(&self) -> ModifierState {
        self.state
    }

    pub fn map(&self) -> &ModifierMap {
        &self.map
    }

    pub fn map_mut(&mut self) -> &mut ModifierMap {
        &mut self.map
    }

    pub fn delayed_key(&self) -> Option<KeyCode> {
        self.delayed_key
    }

    /// Number of translated events waiting for collection
    pub fn translated_len(&self) -> usize {
        self.translated.len()
    }

    /// Removes up to `max` of the oldest translated events
    pub fn take_translated(&mut self, max: usize) -> Vec<RawEvent> {
        let n = max.min(self.translated.len());
        self.translated.drain(..n).collect()
    }

    /// Returns uncollected events to the front, keeping their order
    pub fn restore_translated(&mut self, events: Vec<RawEvent>) {
        for event in events.into_iter().rev() {
            self.translated.push_front(event);
        }
    }

    fn pair_enabled(&self, bound: bool, allow_unbound: bool) -> bool {
        allow_unbound || bound
    }

    /// Runs one translation pass over the events currently queued for `mask`.
    ///
    /// A delayed modifier release from the previous pass is emitted first.
    /// Every event queued at the start is taken in batches of
    /// [`TRANSLATE_BATCH`] and translated into the device-side buffer read by
    /// [`take_translated`](Self::take_translated). Buffered events stay out of
    /// the shared queue, so they are never translated twice.
    pub fn translate_pending(
        &mut self,
        queue: &mut dyn EventQueue,
        mask: EventMask,
        keys: &KeyStateTable,
        emu_keys: &KeyStateTable,
        allow_unbound: bool,
    ) {
        if let Some(key) = self.delayed_key.take() {
            debug!("Flushing delayed release of {}", key);
            self.translated.push_back(RawEvent::key(key, false));
        }

        if !allow_unbound && !self.map.any_bound() {
            trace!("No bound modifier combos, skipping translation");
            return;
        }

        let pending = queue.count(mask);
        if pending == 0 {
            return;
        }

        let mut pass = TranslatePass::new(keys, emu_keys, allow_unbound);
        // Earlier output not applied to `keys` yet
        for event in &self.translated {
            if let RawEvent::Key { code, pressed } = *event {
                pass.snapshot.set(code, pressed);
            }
        }

        let mut processed = 0;
        while processed < pending {
            let batch = queue.take(mask, TRANSLATE_BATCH.min(pending - processed));
            if batch.is_empty() {
                break;
            }
            processed += batch.len();

            for event in batch {
                self.translate_event(event, &mut pass);
            }
            self.translated.extend(pass.out.drain(..));
        }
        trace!("Translated {} events, state {:?}", processed, self.state);
    }

    /// Translates a single event, appending the result to `pass.out`
    pub fn translate_event(&mut self, event: RawEvent, pass: &mut TranslatePass<'_>) {
        let (code, pressed) = match event {
            RawEvent::Key { code, pressed } => (code, pressed),
            other => {
                pass.out.push(other);
                return;
            }
        };

        if code != self.modifier {
            self.translate_plain_key(code, pressed, pass);
            return;
        }

        match (self.state, pressed) {
            (ModifierState::Idle, true) => {
                // Ignore the press until we know whether this is a combo.
                // Only the first held pair switches.
                let held = self.map.iter().find(|(pair, bound)| {
                    pass.snapshot.test(pair.in_key) && self.pair_enabled(*bound, pass.allow_unbound)
                });
                self.state = match held {
                    Some((pair, _)) => {
                        debug!("Combo engaged: {} -> {}", pair.in_key, pair.out_key);
                        pass.switch_key(pair.in_key, pair.out_key);
                        ModifierState::Active
                    }
                    None => ModifierState::Pending,
                };
            }
            (ModifierState::Idle, false) => pass.out.push(event),
            (ModifierState::Pending, true) | (ModifierState::Active, true) => {
                pass.out.push(event)
            }
            (ModifierState::Pending, false) => {
                // Modifier tapped alone: deliver a full press
                self.state = ModifierState::Idle;
                pass.out.push(RawEvent::key(code, true));
                if pass.emu_keys.test(code) {
                    pass.out.push(RawEvent::key(code, false));
                } else {
                    // Release on the next poll so the press is not lost
                    self.delayed_key = Some(code);
                }
            }
            (ModifierState::Active, false) => {
                self.state = ModifierState::Idle;
                for (pair, _) in self.map.iter() {
                    if pass.snapshot.test(pair.out_key) {
                        debug!("Combo released: {} -> {}", pair.out_key, pair.in_key);
                        pass.switch_key(pair.out_key, pair.in_key);
                    }
                }
            }
        }
    }

    fn translate_plain_key(&mut self, code: KeyCode, pressed: bool, pass: &mut TranslatePass<'_>) {
        if self.state == ModifierState::Idle {
            pass.emit(code, pressed);
            return;
        }

        let mut matched = false;
        for (pair, bound) in self.map.iter() {
            if pair.in_key == code && self.pair_enabled(bound, pass.allow_unbound) {
                pass.emit(pair.out_key, pressed);
                matched = true;
            }
        }

        if matched {
            self.state = ModifierState::Active;
        } else {
            pass.emit(code, pressed);
        }
    }
}
