// The three ways of picking the next tone.
//
// walk:   no memory beyond the previous tone; octave drifts only at scale edges
// grow:   a loop replayed from the top, one new note appended per pass
// mutate: a loop replayed from the top, each pass may splice in a note or
//         rewrite one, and length grows only now and then

use rand::{Rng, RngCore};

use crate::error::Result;
use crate::shared::{
    PolicyKind, Sound, MAX_LENGTH_DIVISOR, N_OCTAVES, PROB_OCTAVE_CHANGE, STEPS_PER_OCTAVE,
};

use super::sequence::{NodeId, Sequence};

pub trait Policy {
    fn next_sound(&mut self, rng: &mut dyn RngCore) -> Result<Sound>;

    // The stored melody, for the policies that keep one.
    fn sequence(&self) -> Option<&Sequence> {
        None
    }
}

impl PolicyKind {
    pub fn to_policy(self) -> Box<dyn Policy> {
        match self {
            PolicyKind::Walk => Box::new(RandomWalk::new()),
            PolicyKind::Grow => Box::new(GrowingLoop::new()),
            PolicyKind::Mutate => Box::new(MutatingLoop::new()),
        }
    }
}

// -- random draws --

fn random_octave(rng: &mut dyn RngCore) -> u8 {
    rng.gen_range(0..N_OCTAVES)
}

fn random_step(rng: &mut dyn RngCore) -> u8 {
    rng.gen_range(0..STEPS_PER_OCTAVE)
}

fn random_length(rng: &mut dyn RngCore) -> u8 {
    rng.gen_range(1..MAX_LENGTH_DIVISOR)
}

// Nudge `octave_n` one octave toward where `prev_step` is pointing, with
// probability 1/PROB_OCTAVE_CHANGE, but only when that step sits on the
// lowest or highest rung of the scale.
pub fn reflect_octave(octave_n: u8, prev_step: u8, rng: &mut dyn RngCore) -> u8 {
    if rng.gen_range(0..PROB_OCTAVE_CHANGE) != 0 {
        return octave_n;
    }
    if prev_step == 0 && octave_n > 0 {
        octave_n - 1
    } else if prev_step == STEPS_PER_OCTAVE - 1 && octave_n < N_OCTAVES - 1 {
        octave_n + 1
    } else {
        octave_n
    }
}

// A fresh note that follows `pred`: its octave, edge-reflected off its step.
pub fn follow_up(pred: &Sound, rng: &mut dyn RngCore) -> Sound {
    let octave_n = reflect_octave(pred.octave_n, pred.freq_step, rng);
    Sound::new(random_step(rng), octave_n, random_length(rng))
}

// -- walk --

#[derive(Clone, Debug, Default)]
pub struct RandomWalk {
    last: Sound,
}

impl RandomWalk {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Policy for RandomWalk {
    fn next_sound(&mut self, rng: &mut dyn RngCore) -> Result<Sound> {
        if self.last.is_unset() {
            self.last.octave_n = random_octave(rng);
        }
        self.last = follow_up(&self.last, rng);
        Ok(self.last)
    }
}

// -- shared loop state for grow / mutate --

#[derive(Clone, Debug)]
struct LoopState {
    seq: Sequence,
    cursor: NodeId,
}

impl LoopState {
    fn init(rng: &mut dyn RngCore) -> Self {
        let first = Sound::new(random_step(rng), random_octave(rng), random_length(rng));
        let seq = Sequence::new(first);
        let cursor = seq.head();
        Self { seq, cursor }
    }

    fn rewind(&mut self) {
        self.cursor = self.seq.head();
    }
}

fn loop_state<'a>(state: &'a mut Option<LoopState>, rng: &mut dyn RngCore) -> &'a mut LoopState {
    state.get_or_insert_with(|| LoopState::init(rng))
}

// -- grow --

#[derive(Clone, Debug, Default)]
pub struct GrowingLoop {
    state: Option<LoopState>,
}

impl GrowingLoop {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Policy for GrowingLoop {
    fn next_sound(&mut self, rng: &mut dyn RngCore) -> Result<Sound> {
        let st = loop_state(&mut self.state, rng);
        let sound = *st.seq.sound(st.cursor);
        match st.seq.next(st.cursor) {
            Some(next) => st.cursor = next,
            None => {
                let tail = st.cursor;
                let added = follow_up(st.seq.sound(tail), rng);
                st.seq.insert_after(tail, added)?;
                log::debug!("loop grew to {} notes", st.seq.len());
                st.rewind();
            }
        }
        Ok(sound)
    }

    fn sequence(&self) -> Option<&Sequence> {
        self.state.as_ref().map(|st| &st.seq)
    }
}

// -- mutate --

#[derive(Clone, Debug, Default)]
pub struct MutatingLoop {
    state: Option<LoopState>,
}

impl MutatingLoop {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Policy for MutatingLoop {
    fn next_sound(&mut self, rng: &mut dyn RngCore) -> Result<Sound> {
        let st = loop_state(&mut self.state, rng);
        let sound = *st.seq.sound(st.cursor);
        match st.seq.next(st.cursor) {
            Some(next) => st.cursor = next,
            None => {
                mutate(&mut st.seq, rng)?;
                st.rewind();
            }
        }
        Ok(sound)
    }

    fn sequence(&self) -> Option<&Sequence> {
        self.state.as_ref().map(|st| &st.seq)
    }
}

// One end-of-pass mutation. With i_max notes stored:
//   1 in 3*i_max+1   splice a new note after a random existing one
//   else 3 in 4      rewrite the step or the length of a random note
//   else             leave the loop alone
fn mutate(seq: &mut Sequence, rng: &mut dyn RngCore) -> Result<()> {
    let i_max = seq.len();
    if rng.gen_range(0..3 * i_max + 1) == 0 {
        let pred = pick(seq, i_max, rng);
        let added = follow_up(seq.sound(pred), rng);
        seq.insert_after(pred, added)?;
        log::debug!("spliced a note, loop is now {} notes", seq.len());
    } else if rng.gen_range(0..4) != 0 {
        let id = pick(seq, i_max, rng);
        if rng.gen_range(0..2) == 0 {
            let octave_n = match seq.predecessor(id) {
                Some(pred) => {
                    let pred = *seq.sound(pred);
                    reflect_octave(pred.octave_n, pred.freq_step, rng)
                }
                None => seq.sound(id).octave_n,
            };
            let step = random_step(rng);
            let target = seq.sound_mut(id);
            target.freq_step = step;
            target.octave_n = octave_n;
            log::debug!("rewrote step of a note to {step}");
        } else {
            let length_div = random_length(rng);
            seq.sound_mut(id).length_div = length_div;
            log::debug!("rewrote length of a note to 1/{length_div}");
        }
    }
    Ok(())
}

fn pick(seq: &Sequence, i_max: usize, rng: &mut dyn RngCore) -> NodeId {
    let index = rng.gen_range(0..i_max);
    // index < len, the walk always lands on a node
    seq.nth(index).unwrap_or_else(|| seq.tail())
}
