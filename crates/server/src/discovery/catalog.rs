//! Static tables backing course discovery: course platforms, the curated
//! course dataset, and the rotation lists used for generated entries.

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Platform {
    /// Label shown to users and used to associate curated courses with a platform.
    pub source: &'static str,
    /// Accent color as a bare hex triplet, e.g. `800000`.
    pub color: &'static str,
    /// Platform search endpoint; the percent-encoded query is appended verbatim.
    pub search_url: Option<&'static str>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CuratedCourse {
    pub title: &'static str,
    pub author: &'static str,
    pub source: &'static str,
    pub description: &'static str,
    pub url: &'static str,
    pub category: &'static str,
    /// Lowercased keywords, matched as substrings of the query.
    pub keywords: &'static [&'static str],
}

impl CuratedCourse {
    /// `query` must already be lowercased.
    pub fn matches(&self, query: &str) -> bool {
        self.title.to_lowercase().contains(query)
            || self.keywords.iter().any(|keyword| query.contains(keyword))
            || self.category.to_lowercase().contains(query)
    }
}

#[derive(Clone, Copy, Debug)]
pub struct Catalog {
    pub platforms: &'static [Platform],
    pub fallback_platform: Platform,
    pub curated: &'static [CuratedCourse],
    pub universities: &'static [&'static str],
    pub credential_types: &'static [&'static str],
}

impl Catalog {
    pub fn builtin() -> &'static Catalog {
        &BUILTIN_CATALOG
    }

    pub fn platform_for_source(&self, source: &str) -> &Platform {
        self.platforms
            .iter()
            .find(|platform| platform.source == source)
            .unwrap_or(&self.fallback_platform)
    }
}

const HARVARD: Platform = Platform {
    source: "Harvard Online",
    color: "800000",
    search_url: Some("https://pll.harvard.edu/search?q="),
};
const EDX: Platform = Platform {
    source: "edX",
    color: "02262B",
    search_url: Some("https://www.edx.org/search?q="),
};
const KHAN: Platform = Platform {
    source: "Khan Academy",
    color: "14BF96",
    search_url: Some("https://www.khanacademy.org/search?page_search_query="),
};
const MIT: Platform = Platform {
    source: "MIT OpenCourseWare",
    color: "A31F34",
    search_url: Some("https://ocw.mit.edu/search/?q="),
};
const ALISON: Platform = Platform {
    source: "Alison",
    color: "2D8CEB",
    search_url: Some("https://alison.com/courses?q="),
};
const GOOGLE: Platform = Platform {
    source: "Google Cloud",
    color: "4285F4",
    search_url: Some("https://www.google.com/search?q="),
};
const COURSERA: Platform = Platform {
    source: "Coursera",
    color: "0056D2",
    search_url: Some("https://www.coursera.org/search?query="),
};

static PLATFORMS: [Platform; 7] = [HARVARD, EDX, KHAN, MIT, ALISON, GOOGLE, COURSERA];

static CURATED_COURSES: [CuratedCourse; 14] = [
    CuratedCourse {
        title: "CS50: Introduction to Computer Science",
        author: "Harvard University",
        source: HARVARD.source,
        description: "Uma introdução às áreas intelectuais da ciência da computação e à arte da programação.",
        url: "https://pll.harvard.edu/course/cs50-introduction-computer-science",
        category: "Tecnologia",
        keywords: &["cs50", "computacao", "programacao", "python", "c", "introducao", "harvard"],
    },
    CuratedCourse {
        title: "The Architectural Imagination",
        author: "Harvard University",
        source: HARVARD.source,
        description: "Aprenda a ler a arquitetura como uma forma de imaginação cultural.",
        url: "https://pll.harvard.edu/course/architectural-imagination",
        category: "Arquitectura",
        keywords: &["arquitetura", "historia", "design", "arte", "imagination"],
    },
    CuratedCourse {
        title: "Entrepreneurship in Emerging Economies",
        author: "Harvard University",
        source: HARVARD.source,
        description: "Explore como o empreendedorismo e a inovação abordam problemas sociais complexos em economias emergentes.",
        url: "https://pll.harvard.edu/course/entrepreneurship-emerging-economies",
        category: "Economia",
        keywords: &["empreendedorismo", "negocios", "economia", "inovacao", "business"],
    },
    CuratedCourse {
        title: "Fundamentals of Neuroscience",
        author: "Harvard University",
        source: HARVARD.source,
        description: "Aprenda os fundamentos da neurociência através de eletrofisiologia, anatomia e inteligência.",
        url: "https://pll.harvard.edu/course/fundamentals-neuroscience",
        category: "Medicina",
        keywords: &["neurociencia", "saude", "biologia", "medicina", "cerebro"],
    },
    CuratedCourse {
        title: "Artificial Intelligence (AI)",
        author: "Columbia University",
        source: EDX.source,
        description: "Aprenda os fundamentos da Inteligência Artificial e como aplicá-los.",
        url: "https://www.edx.org/course/artificial-intelligence-ai",
        category: "Tecnologia",
        keywords: &["ia", "ai", "inteligencia artificial", "machine learning"],
    },
    CuratedCourse {
        title: "Data Science: R Basics",
        author: "Harvard via edX",
        source: EDX.source,
        description: "A introdução perfeita para quem quer entrar no mundo da ciência de dados.",
        url: "https://www.edx.org/course/data-science-r-basics",
        category: "Tecnologia",
        keywords: &["data science", "dados", "r", "estatistica"],
    },
    CuratedCourse {
        title: "Introduction to Algorithms",
        author: "MIT",
        source: MIT.source,
        description: "Aprenda as técnicas fundamentais para projetar e analisar algoritmos eficientes.",
        url: "https://ocw.mit.edu/courses/6-006-introduction-to-algorithms-spring-2020/",
        category: "Tecnologia",
        keywords: &["algoritmos", "computacao", "mit", "data structures"],
    },
    CuratedCourse {
        title: "Microeconomics",
        author: "MIT",
        source: MIT.source,
        description: "Principles of Microeconomics covers the fundamental concepts of individual decision making.",
        url: "https://ocw.mit.edu/courses/14-01-principles-of-microeconomics-fall-2018/",
        category: "Economia",
        keywords: &["microeconomia", "economia", "mit", "financas"],
    },
    CuratedCourse {
        title: "Diploma in Project Management",
        author: "Alison",
        source: ALISON.source,
        description: "Domine as metodologias de gestão de projetos reconhecidas internacionalmente.",
        url: "https://alison.com/course/diploma-in-project-management-revised-2017",
        category: "Economia",
        keywords: &["gestao", "projetos", "management", "business"],
    },
    CuratedCourse {
        title: "Human Anatomy and Physiology",
        author: "Alison",
        source: ALISON.source,
        description: "Um mergulho profundo no funcionamento do corpo humano.",
        url: "https://alison.com/course/human-anatomy-and-physiology",
        category: "Medicina",
        keywords: &["anatomia", "fisiologia", "saude", "medicina"],
    },
    CuratedCourse {
        title: "World History",
        author: "Khan Academy",
        source: KHAN.source,
        description: "Uma jornada completa pela história da humanidade, desde as primeiras civilizações.",
        url: "https://www.khanacademy.org/humanities/world-history",
        category: "História",
        keywords: &["historia", "humanidades", "civilizacao", "world history"],
    },
    CuratedCourse {
        title: "Machine Learning (Stanford)",
        author: "Stanford University",
        source: COURSERA.source,
        description: "O curso de Machine Learning mais famoso do mundo, lecionado por Andrew Ng.",
        url: "https://www.coursera.org/learn/machine-learning",
        category: "Tecnologia",
        keywords: &["machine learning", "ia", "stanford", "andrew ng", "dados"],
    },
    CuratedCourse {
        title: "Google Data Analytics Professional Certificate",
        author: "Google",
        source: COURSERA.source,
        description: "Prepare-se para uma carreira em análise de dados com este programa certificado pelo Google.",
        url: "https://www.coursera.org/professional-certificates/google-data-analytics",
        category: "Tecnologia",
        keywords: &["data analytics", "google", "dados", "analise", "sql", "tableau"],
    },
    CuratedCourse {
        title: "The Science of Well-Being (Yale)",
        author: "Yale University",
        source: COURSERA.source,
        description: "Aprenda os desafios psicológicos da felicidade e como construir hábitos produtivos.",
        url: "https://www.coursera.org/learn/the-science-of-well-being",
        category: "Saúde",
        keywords: &["psicologia", "bem-estar", "felicidade", "yale", "saude"],
    },
];

static UNIVERSITIES: [&str; 13] = [
    "Stanford University",
    "Massachusetts Institute of Technology (MIT)",
    "Harvard University",
    "University of Oxford",
    "University of Cambridge",
    "University of California, Berkeley",
    "Yale University",
    "Princeton University",
    "ETH Zurich",
    "University of Tokyo",
    "University of São Paulo (USP)",
    "National University of Singapore",
    "Tsinghua University",
];

static CREDENTIAL_TYPES: [&str; 6] = [
    "Professional Certificate",
    "Specialization",
    "MicroMasters® Program",
    "MasterTrack® Certificate",
    "Bootcamp",
    "Introduction to",
];

static BUILTIN_CATALOG: Catalog = Catalog {
    platforms: &PLATFORMS,
    fallback_platform: EDX,
    curated: &CURATED_COURSES,
    universities: &UNIVERSITIES,
    credential_types: &CREDENTIAL_TYPES,
};
