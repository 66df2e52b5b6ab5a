// Built-in starting document and the handful of labels the core emits itself.
// Everything else the dashboard shows is localized client-side.

use crate::document::models::{
    Contact, EducationEntry, ExperienceEntry, Language, ModuleConfig, Profile, ProjectEntry,
    ResumeDocument, Skill, SkillCategory, Stats,
};

/// Labels the service produces on its own (chat turns it authors).
pub struct Labels {
    pub greeting: &'static str,
    pub update_available: &'static str,
}

const LABELS_EN: Labels = Labels {
    greeting: "System Online. Neural Interface Connected. How can I assist with your profile data?",
    update_available: "System Update Available",
};

const LABELS_ZH: Labels = Labels {
    greeting: "系统已上线。神经接口已连接。我能为您的档案数据做些什么？",
    update_available: "可用系统更新",
};

pub fn labels(lang: Language) -> &'static Labels {
    match lang {
        Language::En => &LABELS_EN,
        Language::Zh => &LABELS_ZH,
    }
}

/// Seed defaults used on first start, after a corrupt slot, and on reset.
pub fn seed_document(lang: Language) -> ResumeDocument {
    ResumeDocument {
        profile: seed_profile(lang),
        skills: seed_skills(),
        experience: seed_experience(lang),
        education: seed_education(lang),
        projects: seed_projects(lang),
        config: ModuleConfig::default(),
    }
}

fn seed_profile(lang: Language) -> Profile {
    let (title, bio, location) = match lang {
        Language::En => (
            "Senior Frontend Architect",
            "Specialized in building immersive, high-performance web interfaces. Obsessed with micro-interactions and clean architecture.",
            "San Francisco, CA",
        ),
        Language::Zh => (
            "高级前端架构师",
            "专注于构建沉浸式、高性能的Web界面。痴迷于微交互和整洁的架构设计。",
            "上海, 中国",
        ),
    };

    Profile {
        name: "ALEX_DEV_01".to_string(),
        title: title.to_string(),
        level: 8,
        bio: bio.to_string(),
        contact: Contact {
            email: "alex@example.com".to_string(),
            github: "github.com/alexdev".to_string(),
            linkedin: "linkedin.com/in/alexdev".to_string(),
            phone: None,
            location: Some(location.to_string()),
        },
        stats: Stats {
            intelligence: 90,
            creativity: 85,
            endurance: 75,
            charisma: 60,
            agility: 95,
            luck: 40,
        },
    }
}

fn seed_skills() -> Vec<Skill> {
    [
        ("React / Next.js", 95, SkillCategory::Frontend),
        ("TypeScript", 90, SkillCategory::Frontend),
        ("Three.js / WebGL", 75, SkillCategory::Design),
        ("Node.js", 80, SkillCategory::Backend),
        ("Tailwind CSS", 95, SkillCategory::Design),
        ("Docker / CI/CD", 70, SkillCategory::Tools),
    ]
    .into_iter()
    .map(|(name, level, category)| Skill {
        name: name.to_string(),
        level,
        category,
    })
    .collect()
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn seed_experience(lang: Language) -> Vec<ExperienceEntry> {
    let (first, second) = match lang {
        Language::En => (
            (
                "Senior Frontend Engineer",
                "CyberTech Solutions",
                "2021 - Present",
                "Leading the frontend team in rebuilding the core SaaS platform using Next.js and WebGL.",
                strings(&[
                    "Improved core web vitals by 40%",
                    "Architected a micro-frontend system",
                    "Mentored 5 junior developers",
                ]),
            ),
            (
                "Frontend Developer",
                "NeoSystems",
                "2018 - 2021",
                "Developed responsive dashboards for fintech clients.",
                strings(&[
                    "Built a real-time data visualization engine",
                    "Reduced build times by 50%",
                ]),
            ),
        ),
        Language::Zh => (
            (
                "高级前端工程师",
                "赛博科技解决方案",
                "2021 - 至今",
                "带领前端团队使用 Next.js 和 WebGL 重构核心 SaaS 平台。",
                strings(&["核心 Web 指标提升 40%", "架构微前端系统", "指导 5 名初级开发人员"]),
            ),
            (
                "前端开发工程师",
                "新系统科技",
                "2018 - 2021",
                "为金融科技客户开发响应式仪表板。",
                strings(&["构建实时数据可视化引擎", "构建时间减少 50%"]),
            ),
        ),
    };

    vec![
        ExperienceEntry {
            id: "exp-1".to_string(),
            role: first.0.to_string(),
            company: first.1.to_string(),
            period: first.2.to_string(),
            year: 2021,
            description: first.3.to_string(),
            achievements: first.4,
            tech_stack: strings(&["React", "TypeScript", "GraphQL", "AWS"]),
        },
        ExperienceEntry {
            id: "exp-2".to_string(),
            role: second.0.to_string(),
            company: second.1.to_string(),
            period: second.2.to_string(),
            year: 2018,
            description: second.3.to_string(),
            achievements: second.4,
            tech_stack: strings(&["Vue.js", "D3.js", "Firebase"]),
        },
    ]
}

fn seed_education(lang: Language) -> Vec<EducationEntry> {
    let (school, degree, description) = match lang {
        Language::En => (
            "Tech University of Future",
            "B.S. Computer Science",
            "Focus on Artificial Intelligence and Human-Computer Interaction. Graduated Cum Laude.",
        ),
        Language::Zh => (
            "未来科技大学",
            "计算机科学学士",
            "主修人工智能与人机交互。优等毕业生。",
        ),
    };

    vec![EducationEntry {
        id: "edu-1".to_string(),
        school: school.to_string(),
        degree: degree.to_string(),
        year: 2018,
        period: "2014 - 2018".to_string(),
        description: description.to_string(),
    }]
}

fn seed_projects(lang: Language) -> Vec<ProjectEntry> {
    let names = match lang {
        Language::En => [
            (
                "Neon Dashboard",
                "A high-performance admin dashboard with cyberpunk aesthetics.",
            ),
            (
                "AI Chat Interface",
                "Real-time chat interface using Gemini API.",
            ),
        ],
        Language::Zh => [
            ("霓虹仪表盘", "具有赛博朋克美学的高性能管理仪表盘。"),
            ("AI 聊天界面", "使用 Gemini API 的实时聊天界面。"),
        ],
    };

    vec![
        ProjectEntry {
            id: "proj-1".to_string(),
            name: names[0].0.to_string(),
            description: names[0].1.to_string(),
            tech: strings(&["React", "Tailwind", "Vite"]),
            link: None,
        },
        ProjectEntry {
            id: "proj-2".to_string(),
            name: names[1].0.to_string(),
            description: names[1].1.to_string(),
            tech: strings(&["Next.js", "AI SDK", "WebSocket"]),
            link: None,
        },
    ]
}
