//! Built-in, hand-authored portfolio content.
//!
//! Keywords are already lowercase so [`KnowledgeBase::resume`] can skip
//! normalization.
//!
//! [`KnowledgeBase::resume`]: crate::knowledge::KnowledgeBase::resume

use crate::knowledge::KnowledgeChunk;
use crate::types::{Emphasis, ScriptLine};

/// Id of the Bridge SaaS project chunk.
pub const BRIDGE_CHUNK_ID: &str = "project-bridge";

/// Id of the FlashCull project chunk.
pub const FLASHCULL_CHUNK_ID: &str = "project-flashcull";

/// Pre-canned questions offered to the visitor.
pub const SUGGESTIONS: [&str; 4] = [
    "What is the Bridge SaaS?",
    "Tell me about FlashCull performance.",
    "What is his tech stack?",
    "Does he know Next.js 15?",
];

/// Log lines of the Bridge tenant-boot demo.
pub const BRIDGE_DEMO_STEPS: [&str; 6] = [
    "Initializing Multi-tenant Environment...",
    "Connecting to PostgreSQL (Drizzle ORM)...",
    "Loading Admission Workflow Module...",
    "Verifying Vehicle Fleet Status...",
    "Payment Gateway: STRIPE_TEST_MODE... Connected.",
    "Tenant 'Mumbai_Driving_School_01' Dashboard Loaded.",
];

pub(crate) fn chunks() -> Vec<KnowledgeChunk> {
    vec![
        KnowledgeChunk::new(
            "about",
            "Summary",
            "Full stack software engineer with an MS in Computer Science and hands-on experience building scalable web applications. Strong proficiency in TypeScript, React, Next.js, and PostgreSQL. Focused on writing clean, maintainable code and building responsive user interfaces. Actively seeking Software Engineer or Full Stack roles to build modern web products.",
            &["about", "summary", "full stack", "software engineer", "typescript", "react", "next.js", "postgresql", "web applications"],
        ),
        KnowledgeChunk::new(
            "skills",
            "Frontend Skills",
            "Frontend Development: React, Next.js 15, TypeScript, JavaScript (ES6+), HTML5, CSS3, Tailwind CSS, Vite, Redux.",
            &["frontend", "react", "next.js 15", "typescript", "javascript", "tailwind", "vite", "redux"],
        ),
        KnowledgeChunk::new(
            "skills",
            "Backend & Database Skills",
            "Backend & Databases: Node.js, Express, REST APIs, PostgreSQL, MySQL, MongoDB, Drizzle ORM, Prisma, SQL Query Optimization.",
            &["backend", "node.js", "express", "rest api", "postgresql", "mysql", "mongodb", "drizzle", "prisma", "sql"],
        ),
        KnowledgeChunk::new(
            "skills",
            "Testing & Quality",
            "Testing & Quality: Jest, React Testing Library, Cypress, Playwright, Storybook, ESLint, Prettier.",
            &["testing", "jest", "cypress", "playwright", "storybook", "quality"],
        ),
        KnowledgeChunk::new(
            "skills",
            "DevOps & Tools",
            "DevOps & Tools: Git, GitHub, Docker, AWS (EC2, S3), Jenkins, Linux, CI/CD Pipelines, Jira.",
            &["devops", "git", "docker", "aws", "ec2", "s3", "jenkins", "linux", "ci/cd", "jira"],
        ),
        KnowledgeChunk::new(
            BRIDGE_CHUNK_ID,
            "Bridge SaaS Platform",
            "Bridge: An End-to-End Driving School Automation SaaS built with React, Next.js 15, TypeScript, Postgres, and Drizzle. Features multi-tenant architecture, comprehensive admission workflows, vehicle fleet management, and payment processing. Leading go-to-market strategy to scale across Mumbai's driving school market.",
            &["bridge", "saas", "driving school", "automation", "next.js", "postgres", "drizzle", "multi-tenant"],
        ),
        KnowledgeChunk::new(
            FLASHCULL_CHUNK_ID,
            "FlashCull Photo Tool",
            "FlashCull: A high-performance local-first photo culling tool built with React, TypeScript, Electron, and Vite. Handles large file operations directly from disk. Code available at https://github.com/shubhammadhavi/FlashCull. Implemented advanced caching and web workers to render fast previews for RAW/HEIC formats, reducing interaction latency by 40%.",
            &["flashcull", "photo culling", "local-first", "electron", "vite", "performance", "raw", "heic", "web workers", "github", "demo"],
        ),
        KnowledgeChunk::new(
            "exp-safeline",
            "Safeline Electricals Experience",
            "Software Developer (Part-time) at Safeline Electricals (Aug 2021 – Present). Builds and maintains customer-facing web presence ensuring high availability and SEO optimization. Implements responsive UI components using semantic HTML, CSS, and JavaScript. Collaborates with stakeholders to translate requirements into technical features.",
            &["safeline electricals", "software developer", "web presence", "seo", "responsive ui"],
        ),
        KnowledgeChunk::new(
            "edu-pace",
            "Pace University Education",
            "Master of Science in Computer Science from Pace University (May 2024). GPA: 3.66. Relevant Coursework: Algorithms, Database Management Systems, Distributed Computing, Mobile Web Development.",
            &["pace university", "master", "ms", "computer science", "gpa", "algorithms", "database"],
        ),
        KnowledgeChunk::new(
            "contact",
            "Contact Information",
            "You can reach Shubham at shubhammadhavi9@gmail.com or by phone at 201-526-5040. Currently based in Jersey City, NJ 07307.",
            &["email", "phone", "contact", "location", "jersey city", "nj"],
        ),
    ]
}

/// The "terminal boot" typewriter script.
pub fn boot_script() -> Vec<ScriptLine> {
    use Emphasis::{Info, Strong, Success};

    vec![
        ScriptLine::plain("> BOOTING FULLSTACK_DEV_BOT_v4.0..."),
        ScriptLine::styled("> LOAD MODULE: Next.js 15 (Core)... [OK]", Success),
        ScriptLine::styled("> LOAD MODULE: TypeScript Strict Mode... [OK]", Success),
        ScriptLine::plain("> ACCESSING PROFILE: Shubham Madhavi"),
        ScriptLine::plain("> SCANNING STACK..."),
        ScriptLine::styled(">  - FRONTEND: React, Tailwind, Vite, Redux", Info),
        ScriptLine::styled(">  - BACKEND: Node.js, Postgres, Drizzle, Prisma", Info),
        ScriptLine::styled(">  - TESTING: Cypress, Playwright, Jest", Info),
        ScriptLine::styled(">  - DEVOPS: Docker, AWS (EC2, S3), CI/CD", Info),
        ScriptLine::plain(""),
        ScriptLine::plain("> ANALYZING PROJECTS..."),
        ScriptLine::plain("> DETECTED: 'Bridge' (SaaS, Multi-tenant Architecture)"),
        ScriptLine::plain("> DETECTED: 'FlashCull' (Local-first, High Performance Electron App)"),
        ScriptLine::plain(""),
        ScriptLine::plain("> CALCULATING FIT..."),
        ScriptLine::styled(
            "> RESULT: Modern Full Stack Engineer focused on Scalability & Performance.",
            Info,
        ),
        ScriptLine::styled("> STATUS: READY_TO_DEPLOY", Strong),
        ScriptLine::plain("> "),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keywords_are_lowercase() {
        for chunk in chunks() {
            for kw in &chunk.keywords {
                assert_eq!(kw, &kw.to_lowercase(), "chunk {}", chunk.id);
            }
        }
    }

    #[test]
    fn test_project_ids_present() {
        let all = chunks();
        assert!(all.iter().any(|c| c.id == BRIDGE_CHUNK_ID));
        assert!(all.iter().any(|c| c.id == FLASHCULL_CHUNK_ID));
    }

    #[test]
    fn test_boot_script_shape() {
        let script = boot_script();
        assert_eq!(script.len(), 18);
        assert_eq!(script.iter().filter(|l| l.text.is_empty()).count(), 2);
        assert_eq!(script[16].emphasis, Some(Emphasis::Strong));
    }
}
