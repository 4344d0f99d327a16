/// How a candidate was found in a message. Closed set, applied in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strategy {
    EventbriteText,
    DirectImageText,
    AttachmentImage,
}

impl Strategy {
    pub const ALL: [Strategy; 3] = [
        Strategy::EventbriteText,
        Strategy::DirectImageText,
        Strategy::AttachmentImage,
    ];

    pub fn is_image(self) -> bool {
        matches!(self, Strategy::DirectImageText | Strategy::AttachmentImage)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateLink {
    pub value: String,
    pub strategy: Strategy,
}

impl CandidateLink {
    pub fn new(value: impl Into<String>, strategy: Strategy) -> Self {
        Self {
            value: value.into(),
            strategy,
        }
    }
}

/// An image link paired with its normalized OCR text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageText {
    pub text: String,
    pub link: String,
}
