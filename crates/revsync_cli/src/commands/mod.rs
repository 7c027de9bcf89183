pub(crate) mod course;
pub(crate) mod lecture;
pub(crate) mod reviews;
pub(crate) mod syllabus;
