use crate::models::cv::{Language, Section};

/// Fixed UI strings for one language.
#[derive(Debug)]
pub struct Labels {
    pub personal_details: &'static str,
    pub summary: &'static str,
    pub experience: &'static str,
    pub education: &'static str,
    pub projects: &'static str,
    pub skills: &'static str,
    pub present: &'static str,
    pub current: &'static str,
    pub placeholder_name: &'static str,
}

const EN: Labels = Labels {
    personal_details: "Personal Details",
    summary: "Summary",
    experience: "Experience",
    education: "Education",
    projects: "Projects",
    skills: "Skills",
    present: "Present",
    current: "Current",
    placeholder_name: "YOUR NAME",
};

const VI: Labels = Labels {
    personal_details: "Thông tin cá nhân",
    summary: "Tóm tắt",
    experience: "Kinh nghiệm làm việc",
    education: "Học vấn",
    projects: "Dự án",
    skills: "Kỹ năng",
    present: "Hiện tại",
    current: "Hiện tại",
    placeholder_name: "YOUR NAME",
};

pub fn labels(language: Language) -> &'static Labels {
    match language {
        Language::En => &EN,
        Language::Vi => &VI,
    }
}

impl Labels {
    pub fn section(&self, section: Section) -> &'static str {
        match section {
            Section::PersonalInfo => self.personal_details,
            Section::Summary => self.summary,
            Section::Skills => self.skills,
            Section::Experience => self.experience,
            Section::Education => self.education,
            Section::Projects => self.projects,
        }
    }
}

/// Form label for an addressable field. Unknown names fall back to the raw
/// field name.
pub fn field_label<'a>(language: Language, field: &'a str) -> &'a str {
    let (en, vi) = match field {
        "fullName" => ("Full Name", "Họ và tên"),
        "email" => ("Email", "Email"),
        "phone" => ("Phone", "Số điện thoại"),
        "location" => ("Location", "Địa chỉ"),
        "website" => ("Website", "Trang web"),
        "linkedin" => ("LinkedIn", "LinkedIn"),
        "twitter" => ("Twitter", "Twitter"),
        "github" => ("GitHub", "GitHub"),
        "profilePicture" => ("Profile Picture", "Ảnh đại diện"),
        "summary" => ("Summary", "Tóm tắt"),
        "skills" => ("Skills (comma separated)", "Kỹ năng (phân cách bằng dấu phẩy)"),
        "position" => ("Position", "Vị trí"),
        "company" => ("Company", "Công ty"),
        "institution" => ("Institution", "Trường"),
        "degree" => ("Degree", "Bằng cấp"),
        "name" => ("Project Name", "Tên dự án"),
        "link" => ("Project Link", "Liên kết dự án"),
        "startDate" => ("Start Date", "Ngày bắt đầu"),
        "endDate" => ("End Date", "Ngày kết thúc"),
        "current" => ("Current", "Hiện tại"),
        "description" => ("Description", "Mô tả"),
        _ => return field,
    };
    match language {
        Language::En => en,
        Language::Vi => vi,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_section_labels_per_language() {
        assert_eq!(labels(Language::En).section(Section::Experience), "Experience");
        assert_eq!(labels(Language::Vi).section(Section::Skills), "Kỹ năng");
        assert_eq!(labels(Language::Vi).present, "Hiện tại");
    }

    #[test]
    fn test_field_label_falls_back_to_name() {
        assert_eq!(field_label(Language::En, "startDate"), "Start Date");
        assert_eq!(field_label(Language::Vi, "degree"), "Bằng cấp");
        assert_eq!(field_label(Language::En, "hobbies"), "hobbies");
    }
}
