//! Reveal timeline: sequential tweens over a section's presentation state.
//!
//! The timeline is never played in real time; it is seeked to
//! `progress * duration` whenever the scrubbed scroll progress changes.

use crate::color::Color;

/// Default tween duration in timeline seconds
pub const DEFAULT_DURATION: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Ease {
    Linear,
    #[default]
    Power1Out,
    Power2Out,
    ExpoOut,
}

impl Ease {
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Ease::Linear => t,
            Ease::Power1Out => 1.0 - (1.0 - t).powi(2),
            Ease::Power2Out => 1.0 - (1.0 - t).powi(3),
            Ease::ExpoOut if t >= 1.0 => 1.0,
            Ease::ExpoOut => 1.0 - 2f64.powf(-10.0 * t),
        }
    }
}

/// Element of a section that the timeline animates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    HeadingChar(usize),
    Description,
    SpecItem(usize),
    Background,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Property {
    /// Vertical translation in CSS px
    TranslateY,
    Opacity,
    Scale,
    BackgroundColor,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value {
    Number(f64),
    Color(Color),
}

impl Value {
    fn lerp(self, to: Value, t: f64) -> Value {
        match (self, to) {
            (Value::Number(a), Value::Number(b)) => Value::Number(a + (b - a) * t),
            (Value::Color(a), Value::Color(b)) => Value::Color(a.lerp(b, t)),
            // Mismatched kinds jump at the end of the tween
            (from, to) => {
                if t >= 1.0 {
                    to
                } else {
                    from
                }
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ElementStyle {
    pub y: f64,
    pub opacity: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BackgroundStyle {
    pub color: Color,
    pub scale: f64,
}

/// Animated presentation properties of one section
#[derive(Debug, Clone, PartialEq)]
pub struct SectionPresentation {
    pub heading: Vec<ElementStyle>,
    pub description: ElementStyle,
    pub specs: Vec<ElementStyle>,
    pub background: BackgroundStyle,
}

impl SectionPresentation {
    /// Resting state before any reveal: heading visible, description and
    /// list hidden, background disc at its base size
    pub fn initial(heading_chars: usize, spec_items: usize, background: Color) -> Self {
        let visible = ElementStyle { y: 0.0, opacity: 1.0 };
        let hidden = ElementStyle { y: 0.0, opacity: 0.0 };
        SectionPresentation {
            heading: vec![visible; heading_chars],
            description: hidden,
            specs: vec![hidden; spec_items],
            background: BackgroundStyle {
                color: background,
                scale: 1.0,
            },
        }
    }

    fn element(&self, target: Target) -> Option<&ElementStyle> {
        match target {
            Target::HeadingChar(i) => self.heading.get(i),
            Target::Description => Some(&self.description),
            Target::SpecItem(i) => self.specs.get(i),
            Target::Background => None,
        }
    }

    fn element_mut(&mut self, target: Target) -> Option<&mut ElementStyle> {
        match target {
            Target::HeadingChar(i) => self.heading.get_mut(i),
            Target::Description => Some(&mut self.description),
            Target::SpecItem(i) => self.specs.get_mut(i),
            Target::Background => None,
        }
    }

    pub fn get(&self, target: Target, property: Property) -> Option<Value> {
        match (target, property) {
            (Target::Background, Property::Scale) => Some(Value::Number(self.background.scale)),
            (Target::Background, Property::BackgroundColor) => Some(Value::Color(self.background.color)),
            (_, Property::TranslateY) => self.element(target).map(|e| Value::Number(e.y)),
            (_, Property::Opacity) => self.element(target).map(|e| Value::Number(e.opacity)),
            _ => None,
        }
    }

    pub fn set(&mut self, target: Target, property: Property, value: Value) {
        match (target, property, value) {
            (Target::Background, Property::Scale, Value::Number(v)) => self.background.scale = v,
            (Target::Background, Property::BackgroundColor, Value::Color(c)) => {
                self.background.color = c
            }
            (_, Property::TranslateY, Value::Number(v)) => {
                if let Some(e) = self.element_mut(target) {
                    e.y = v;
                }
            }
            (_, Property::Opacity, Value::Number(v)) => {
                if let Some(e) = self.element_mut(target) {
                    e.opacity = v;
                }
            }
            _ => log::trace!("ignoring {:?} = {:?} on {:?}", property, value, target),
        }
    }
}

/// Tween from each target's initial value to the given end values
#[derive(Debug, Clone, PartialEq)]
pub struct Tween {
    pub targets: Vec<Target>,
    pub values: Vec<(Property, Value)>,
    pub duration: f64,
    pub delay: f64,
    pub stagger: f64,
    pub ease: Ease,
}

impl Tween {
    pub fn to(targets: impl IntoIterator<Item = Target>) -> Self {
        Tween {
            targets: targets.into_iter().collect(),
            values: Vec::new(),
            duration: DEFAULT_DURATION,
            delay: 0.0,
            stagger: 0.0,
            ease: Ease::default(),
        }
    }

    pub fn value(mut self, property: Property, value: Value) -> Self {
        self.values.push((property, value));
        self
    }

    pub fn duration(mut self, duration: f64) -> Self {
        self.duration = duration;
        self
    }

    pub fn delay(mut self, delay: f64) -> Self {
        self.delay = delay;
        self
    }

    pub fn stagger(mut self, stagger: f64) -> Self {
        self.stagger = stagger;
        self
    }

    pub fn ease(mut self, ease: Ease) -> Self {
        self.ease = ease;
        self
    }

    /// Time from the first target starting to the last one finishing
    pub fn total_duration(&self) -> f64 {
        self.duration + self.stagger * self.targets.len().saturating_sub(1) as f64
    }

    /// Eased progress of the `index`-th target at `local` seconds after start
    fn progress(&self, index: usize, local: f64) -> f64 {
        let t = local - self.stagger * index as f64;
        if self.duration <= 0.0 {
            return if t >= 0.0 { 1.0 } else { 0.0 };
        }
        self.ease.apply(t / self.duration)
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Placed {
    start: f64,
    tween: Tween,
}

/// Tweens placed one after another
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Timeline {
    placed: Vec<Placed>,
    end: f64,
}

impl Timeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a tween after everything already on the timeline
    pub fn to(&mut self, tween: Tween) -> &mut Self {
        let start = self.end + tween.delay;
        self.end = start + tween.total_duration();
        self.placed.push(Placed { start, tween });
        self
    }

    pub fn duration(&self) -> f64 {
        self.end
    }

    /// Start time of each tween, in insertion order
    pub fn starts(&self) -> Vec<f64> {
        self.placed.iter().map(|p| p.start).collect()
    }

    /// Presentation at `time`, interpolated from `initial`
    pub fn seek(&self, time: f64, initial: &SectionPresentation) -> SectionPresentation {
        let mut state = initial.clone();
        for placed in &self.placed {
            let local = time - placed.start;
            for (index, target) in placed.tween.targets.iter().enumerate() {
                let t = placed.tween.progress(index, local);
                for (property, to) in &placed.tween.values {
                    if let Some(from) = initial.get(*target, *property) {
                        state.set(*target, *property, from.lerp(*to, t));
                    }
                }
            }
        }
        state
    }

    /// Presentation at a normalized progress in [0, 1]
    pub fn seek_progress(&self, progress: f64, initial: &SectionPresentation) -> SectionPresentation {
        self.seek(progress.clamp(0.0, 1.0) * self.duration(), initial)
    }
}

/// The four-stage reveal run by every section: heading characters drop in,
/// the description and list items rise and fade in, then the background
/// disc takes the section color and expands over the viewport.
pub fn reveal_timeline(heading_chars: usize, spec_items: usize, bgcolor: Color) -> Timeline {
    let mut timeline = Timeline::new();
    timeline
        .to(Tween::to((0..heading_chars).map(Target::HeadingChar))
            .value(Property::TranslateY, Value::Number(200.0))
            .stagger(0.05)
            .duration(1.0)
            .ease(Ease::Power2Out))
        .to(Tween::to([Target::Description])
            .value(Property::TranslateY, Value::Number(-80.0))
            .value(Property::Opacity, Value::Number(1.0))
            .ease(Ease::Power2Out)
            .duration(2.0))
        .to(Tween::to((0..spec_items).map(Target::SpecItem))
            .value(Property::TranslateY, Value::Number(-80.0))
            .value(Property::Opacity, Value::Number(1.0))
            .stagger(1.0)
            .ease(Ease::Power2Out))
        .to(Tween::to([Target::Background])
            .value(Property::BackgroundColor, Value::Color(bgcolor))
            .value(Property::Scale, Value::Number(200.0))
            .duration(2.0)
            .delay(2.0));
    timeline
}
