use super::world::PublisherWorld;
use chrono::{DateTime, Duration, TimeZone, Utc};
use course_publisher::models::{
    Course, CourseRun, NewCourse, NewCourseRun, PacingType, Seat, SeatType,
};
use course_publisher::store::WorkflowRepository;

/// Factory for courses; the default course passes the review checklist
#[derive(Debug, Clone)]
pub struct CourseFactory {
    new_course: NewCourse,
    attach_organization: bool,
}

impl Default for CourseFactory {
    fn default() -> Self {
        Self {
            new_course: NewCourse {
                title: "Intro to Rust".to_string(),
                number: "RS101".to_string(),
                short_description: "Learn Rust".to_string(),
                full_description: "Ownership, borrowing and traits".to_string(),
                expected_learnings: "Write safe systems code".to_string(),
                prerequisites: "Some programming".to_string(),
                level_type: Some("Introductory".to_string()),
                image: Some("images/rust.png".to_string()),
                organization_ids: Vec::new(),
                keywords: vec!["rust".to_string(), "systems".to_string()],
            },
            attach_organization: true,
        }
    }
}

impl CourseFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_title(mut self, title: &str) -> Self {
        self.new_course.title = title.to_string();
        self
    }

    pub fn without_image(mut self) -> Self {
        self.new_course.image = None;
        self
    }

    pub fn without_description(mut self) -> Self {
        self.new_course.full_description = String::new();
        self
    }

    pub fn without_organization(mut self) -> Self {
        self.attach_organization = false;
        self
    }

    /// Create through the service as the world's course team user
    pub async fn create(&self, world: &PublisherWorld) -> Course {
        let mut new_course = self.new_course.clone();
        if self.attach_organization {
            new_course.organization_ids = vec![world.organization.id];
        }
        world
            .service
            .create_course(new_course, world.course_team.id)
            .await
            .expect("course creation")
    }
}

/// Factory for course runs; the default run passes the review checklist
#[derive(Debug, Clone)]
pub struct CourseRunFactory {
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
    min_effort: Option<u32>,
    max_effort: Option<u32>,
    lms_course_id: Option<String>,
    seats: Vec<SeatType>,
    staff_ids: Vec<i64>,
}

impl Default for CourseRunFactory {
    fn default() -> Self {
        let start = Utc
            .with_ymd_and_hms(2026, 3, 1, 0, 0, 0)
            .single()
            .expect("valid start date");
        Self {
            start: Some(start),
            end: Some(start + Duration::days(42)),
            min_effort: Some(3),
            max_effort: Some(5),
            lms_course_id: None,
            seats: vec![SeatType::Verified],
            staff_ids: vec![101],
        }
    }
}

impl CourseRunFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_lms_course_id(mut self, lms_course_id: &str) -> Self {
        self.lms_course_id = Some(lms_course_id.to_string());
        self
    }

    pub fn with_effort(mut self, min: u32, max: u32) -> Self {
        self.min_effort = Some(min);
        self.max_effort = Some(max);
        self
    }

    pub fn ending_before_start(mut self) -> Self {
        self.end = self.start.map(|start| start - Duration::days(1));
        self
    }

    pub fn without_seats(mut self) -> Self {
        self.seats.clear();
        self
    }

    pub fn without_start(mut self) -> Self {
        self.start = None;
        self
    }

    /// Create through the service and wait for the creation notification
    pub async fn create(&self, world: &PublisherWorld, course: &Course) -> CourseRun {
        let new_run = NewCourseRun {
            course_id: course.id,
            lms_course_id: self.lms_course_id.clone(),
            start: self.start,
            end: self.end,
            pacing_type: Some(PacingType::InstructorPaced),
            min_effort: self.min_effort,
            max_effort: self.max_effort,
            language: Some("en".to_string()),
            transcript_languages: vec!["en".to_string()],
            staff_ids: self.staff_ids.clone(),
            preview_url: None,
        };

        let run = world
            .service
            .create_course_run(new_run, world.course_team.id)
            .await
            .expect("course run creation")
            .settle()
            .await;

        for seat_type in &self.seats {
            world
                .repository
                .add_seat(Seat::new(0, run.id, *seat_type), Some(world.course_team.id))
                .await
                .expect("seat");
        }
        run
    }
}
