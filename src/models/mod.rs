pub mod course_names;
pub mod loaders;
pub mod lecture;
pub mod review;
pub mod target;

pub use course_names::CourseNames;
pub use lecture::{LectureCard, LectureRef};
pub use loaders::{load_course_names, load_targets};
pub use review::ReviewRecord;
pub use target::Target;
