//! Animation mixer with weighted clips and linear cross-fades.

use std::collections::BTreeMap;
use std::fmt;

use playground_assets::AnimationClip;
use serde::{Deserialize, Serialize};

/// Locomotion state of a character; each maps to one clip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AnimationState {
    Idle,
    Walk,
    Run,
    Jump,
}

impl AnimationState {
    pub const ALL: [AnimationState; 4] = [Self::Idle, Self::Walk, Self::Run, Self::Jump];

    pub fn clip_name(self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::Walk => "Walk",
            Self::Run => "Run",
            Self::Jump => "Jump",
        }
    }
}

impl fmt::Display for AnimationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.clip_name())
    }
}

/// Index of a clip inside one mixer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClipId(pub usize);

#[derive(Debug, Clone, Copy)]
struct Fade {
    from: f32,
    to: f32,
    elapsed: f32,
    duration: f32,
}

impl Fade {
    fn weight(&self) -> f32 {
        if self.duration <= 0.0 {
            return self.to;
        }
        let t = (self.elapsed / self.duration).clamp(0.0, 1.0);
        self.from + (self.to - self.from) * t
    }

    fn finished(&self) -> bool {
        self.elapsed >= self.duration
    }
}

#[derive(Debug, Clone)]
struct ClipAction {
    clip: AnimationClip,
    time: f32,
    weight: f32,
    playing: bool,
    fade: Option<Fade>,
}

impl ClipAction {
    fn advance(&mut self, dt: f32) {
        if !self.playing {
            return;
        }
        let duration = self.clip.duration;
        self.time += dt;
        if duration > 0.0 {
            self.time = if self.clip.looping {
                self.time.rem_euclid(duration)
            } else {
                self.time.min(duration)
            };
        }
        if let Some(fade) = self.fade.as_mut() {
            fade.elapsed += dt;
            self.weight = fade.weight();
            if fade.finished() {
                let fading_out = fade.to <= 0.0;
                self.fade = None;
                if fading_out {
                    self.playing = false;
                }
            }
        }
    }
}

/// Plays a set of clips with per-clip weights.
///
/// `update(dt)` advances every playing clip and any fade on it. A clip that
/// finishes fading out stops.
#[derive(Debug, Clone, Default)]
pub struct AnimationMixer {
    actions: Vec<ClipAction>,
    names: BTreeMap<String, ClipId>,
}

impl AnimationMixer {
    pub fn from_clips(clips: &[AnimationClip]) -> Self {
        let mut mixer = Self::default();
        for clip in clips {
            let id = ClipId(mixer.actions.len());
            mixer.names.insert(clip.name.clone(), id);
            mixer.actions.push(ClipAction {
                clip: clip.clone(),
                time: 0.0,
                weight: 0.0,
                playing: false,
                fade: None,
            });
        }
        mixer
    }

    pub fn clip_id(&self, name: &str) -> Option<ClipId> {
        self.names.get(name).copied()
    }

    fn action_mut(&mut self, id: ClipId) -> Option<&mut ClipAction> {
        self.actions.get_mut(id.0)
    }

    /// Start playing. A clip that is not fading plays at full weight.
    pub fn play(&mut self, id: ClipId) {
        if let Some(action) = self.action_mut(id) {
            action.playing = true;
            if action.fade.is_none() {
                action.weight = 1.0;
            }
        }
    }

    /// Rewind to the start and drop any fade in progress.
    pub fn reset(&mut self, id: ClipId) {
        if let Some(action) = self.action_mut(id) {
            action.time = 0.0;
            action.fade = None;
        }
    }

    pub fn stop(&mut self, id: ClipId) {
        if let Some(action) = self.action_mut(id) {
            action.playing = false;
            action.weight = 0.0;
            action.fade = None;
        }
    }

    pub fn fade_in(&mut self, id: ClipId, duration: f32) {
        self.schedule_fade(id, 0.0, 1.0, duration);
    }

    /// Fade from the current weight down to zero.
    pub fn fade_out(&mut self, id: ClipId, duration: f32) {
        let from = self.weight(id);
        self.schedule_fade(id, from, 0.0, duration);
    }

    fn schedule_fade(&mut self, id: ClipId, from: f32, to: f32, duration: f32) {
        if let Some(action) = self.action_mut(id) {
            action.weight = from;
            action.fade = Some(Fade {
                from,
                to,
                elapsed: 0.0,
                duration: duration.max(0.0),
            });
        }
    }

    pub fn update(&mut self, dt: f32) {
        let dt = dt.max(0.0);
        for action in &mut self.actions {
            action.advance(dt);
        }
    }

    pub fn weight(&self, id: ClipId) -> f32 {
        self.actions.get(id.0).map_or(0.0, |a| a.weight)
    }

    pub fn time(&self, id: ClipId) -> f32 {
        self.actions.get(id.0).map_or(0.0, |a| a.time)
    }

    pub fn is_playing(&self, id: ClipId) -> bool {
        self.actions.get(id.0).is_some_and(|a| a.playing)
    }

    pub fn is_fading(&self, id: ClipId) -> bool {
        self.actions.get(id.0).is_some_and(|a| a.fade.is_some())
    }

    /// Clips currently playing, in registration order.
    pub fn playing(&self) -> impl Iterator<Item = ClipId> + '_ {
        self.actions
            .iter()
            .enumerate()
            .filter(|(_, a)| a.playing)
            .map(|(i, _)| ClipId(i))
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}
