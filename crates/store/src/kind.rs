//! The three kinds of authored content and their table mapping.

use std::fmt;

/// One authored-content table.
///
/// Each kind lives in its own table with the same shape: a prefixed random
/// id, an owning course or lesson, source bytes, and optional compiled
/// bytes. Ids are unique across all three tables because each kind uses a
/// distinct prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentKind {
    /// The body of a lesson.
    LessonContent,
    /// The transcript attached to a lesson's video.
    LessonTranscript,
    /// The long-form description of a course.
    CourseDetails,
}

impl ContentKind {
    /// Fixed order used when resolving a bare id to its table.
    pub const PROBE_ORDER: [ContentKind; 3] = [
        ContentKind::LessonContent,
        ContentKind::LessonTranscript,
        ContentKind::CourseDetails,
    ];

    /// Table name for this kind.
    pub const fn table(self) -> &'static str {
        match self {
            Self::LessonContent => "lesson_content",
            Self::LessonTranscript => "lesson_transcript",
            Self::CourseDetails => "course_details",
        }
    }

    /// Name of the foreign-key column pointing at the owner.
    pub const fn owner_column(self) -> &'static str {
        match self {
            Self::LessonContent | Self::LessonTranscript => "lesson_id",
            Self::CourseDetails => "course_id",
        }
    }

    /// Id prefix for rows of this kind.
    pub const fn id_prefix(self) -> &'static str {
        match self {
            Self::LessonContent => "lsc",
            Self::LessonTranscript => "lst",
            Self::CourseDetails => "crd",
        }
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.table())
    }
}
