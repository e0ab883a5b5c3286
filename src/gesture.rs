// Turns hand landmarks into per-hand finger states and a draw intent.
//
// Landmarks follow the 21-point hand model (wrist = 0, thumb 1..=4,
// index 5..=8, middle 9..=12, ring 13..=16, pinky 17..=20) in normalized
// image coordinates, y growing downwards. Hands arrive in detector order and
// are classified independently: hand 0 this frame need not be hand 0 next
// frame.

pub const LANDMARK_COUNT: usize = 21;

pub const WRIST: usize = 0;
pub const THUMB_TIP: usize = 4;
pub const INDEX_TIP: usize = 8;

/// Default pinch threshold, in normalized image units.
pub const PINCH_DISTANCE: f32 = 0.05;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
}

impl Landmark {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// One detected hand. A joint the detector could not place is `None`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Hand {
    pub landmarks: [Option<Landmark>; LANDMARK_COUNT],
}

impl Hand {
    pub fn landmark(&self, index: usize) -> Option<Landmark> {
        self.landmarks.get(index).copied().flatten()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Finger {
    Index,
    Middle,
    Ring,
    Pinky,
}

impl Finger {
    pub const ALL: [Finger; 4] = [Finger::Index, Finger::Middle, Finger::Ring, Finger::Pinky];

    /// Landmark indices as (mcp, pip, dip, tip).
    pub const fn joints(self) -> [usize; 4] {
        match self {
            Finger::Index => [5, 6, 7, 8],
            Finger::Middle => [9, 10, 11, 12],
            Finger::Ring => [13, 14, 15, 16],
            Finger::Pinky => [17, 18, 19, 20],
        }
    }

    pub const fn tip(self) -> usize {
        self.joints()[3]
    }

    const fn slot(self) -> usize {
        match self {
            Finger::Index => 0,
            Finger::Middle => 1,
            Finger::Ring => 2,
            Finger::Pinky => 3,
        }
    }
}

/// Which fingers of one hand are raised this frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FingerState {
    raised: [bool; 4],
}

impl FingerState {
    pub fn is_raised(&self, finger: Finger) -> bool {
        self.raised[finger.slot()]
    }
}

/// tip above dip above pip above mcp, strictly. Any missing joint => false.
pub fn is_finger_raised(hand: &Hand, finger: Finger) -> bool {
    let [mcp, pip, dip, tip] = finger.joints();
    match (hand.landmark(tip), hand.landmark(dip), hand.landmark(pip), hand.landmark(mcp)) {
        (Some(tip), Some(dip), Some(pip), Some(mcp)) => tip.y < dip.y && dip.y < pip.y && pip.y < mcp.y,
        _ => false,
    }
}

pub fn finger_state(hand: &Hand) -> FingerState {
    let mut state = FingerState::default();
    for finger in Finger::ALL {
        state.raised[finger.slot()] = is_finger_raised(hand, finger);
    }
    state
}

/// Thumb tip and index tip closer than `threshold`. Missing tips never pinch.
pub fn is_pinching(hand: &Hand, threshold: f32) -> bool {
    match (hand.landmark(THUMB_TIP), hand.landmark(INDEX_TIP)) {
        (Some(t), Some(i)) => {
            let (dx, dy) = (t.x - i.x, t.y - i.y);
            dx * dx + dy * dy < threshold * threshold
        }
        _ => false,
    }
}

/// Classifier output for one hand.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HandGesture {
    pub fingers: FingerState,
    pub draw_intent: bool,
    /// Index fingertip, normalized; `None` if the detector lost it.
    pub index_tip: Option<Landmark>,
}

impl HandGesture {
    /// Index fingertip in pixel coordinates of a `width x height` frame.
    pub fn index_tip_px(&self, width: usize, height: usize) -> Option<crate::types::Point> {
        self.index_tip
            .map(|tip| crate::types::Point::new((tip.x * width as f32).round() as i32, (tip.y * height as f32).round() as i32))
    }
}

#[derive(Clone, Debug, Default)]
pub struct GestureClassifier {
    drawing_enabled: bool,
}

impl GestureClassifier {
    pub fn new(drawing_enabled: bool) -> Self {
        Self { drawing_enabled }
    }

    pub fn set_drawing_enabled(&mut self, enabled: bool) {
        self.drawing_enabled = enabled;
    }

    /// Draw intent: index up, middle down, and drawing mode on.
    pub fn classify(&self, hand: &Hand) -> HandGesture {
        let fingers = finger_state(hand);
        let draw_intent =
            self.drawing_enabled && fingers.is_raised(Finger::Index) && !fingers.is_raised(Finger::Middle);
        HandGesture { fingers, draw_intent, index_tip: hand.landmark(INDEX_TIP) }
    }

    /// Classify every hand, keeping detector order.
    pub fn classify_all(&self, hands: &[Hand]) -> Vec<HandGesture> {
        hands.iter().map(|h| self.classify(h)).collect()
    }
}

/// Build a plausible hand whose index tip sits at (x, y), normalized.
/// Lets a mouse stand in for the landmark model: `index_up` raises the
/// index finger, `pinch` brings the thumb tip onto the index tip.
pub fn pointer_hand(x: f32, y: f32, index_up: bool, pinch: bool) -> Hand {
    let mut lm = [None; LANDMARK_COUNT];
    let mut set = |i: usize, dx: f32, dy: f32| lm[i] = Some(Landmark::new(x + dx, y + dy));

    set(WRIST, 0.02, 0.25);

    // Thumb: 1..=4
    set(1, -0.05, 0.20);
    set(2, -0.07, 0.16);
    set(3, -0.08, 0.12);
    if pinch {
        set(THUMB_TIP, 0.01, 0.01);
    } else {
        set(THUMB_TIP, -0.08, 0.08);
    }

    // Index keeps its tip on the pointer either way; a curled index has the
    // dip above the tip.
    if index_up {
        set(5, 0.0, 0.09);
        set(6, 0.0, 0.06);
        set(7, 0.0, 0.03);
    } else {
        set(5, 0.0, 0.06);
        set(6, 0.0, 0.03);
        set(7, 0.0, -0.02);
    }
    set(INDEX_TIP, 0.0, 0.0);

    // Middle, ring, pinky curled: tip below dip.
    for (n, finger) in [Finger::Middle, Finger::Ring, Finger::Pinky].into_iter().enumerate() {
        let dx = 0.03 * (n as f32 + 1.0);
        let [mcp, pip, dip, tip] = finger.joints();
        set(mcp, dx, 0.10);
        set(pip, dx, 0.07);
        set(dip, dx, 0.08);
        set(tip, dx, 0.10);
    }

    Hand { landmarks: lm }
}
