//! Bundled sample news dataset.
//!
//! Served instead of the BigKinds API when sample mode is on, so imports and
//! searches work without an API key.

use crate::models::NewsArticle;

pub const CATEGORIES: [&str; 6] = ["정치", "경제", "사회", "문화", "국제", "IT_과학"];

struct SampleArticle {
    id: &'static str,
    title: &'static str,
    content: &'static str,
    source: &'static str,
    date: &'static str,
    category: &'static str,
    keywords: &'static [&'static str],
}

const ARTICLES: &[SampleArticle] = &[
    SampleArticle {
        id: "news-001",
        title: "정부, 저출산 대응 종합대책 발표",
        content: "정부가 저출산 문제에 대응하기 위해 출산 지원금 확대와 육아휴직 급여 인상을 골자로 하는 종합대책을 발표했다. 신혼부부 주거 지원과 공공 보육시설 확충도 포함됐다.",
        source: "연합뉴스",
        date: "2024-03-15",
        category: "정치",
        keywords: &["저출산", "출산지원", "육아휴직", "주거지원"],
    },
    SampleArticle {
        id: "news-002",
        title: "합계출산율 역대 최저치 경신",
        content: "통계청에 따르면 지난해 합계출산율이 0.72명으로 역대 최저치를 기록했다. 전문가들은 저출산 추세가 노동력 감소와 연금 재정 악화로 이어질 수 있다고 경고했다.",
        source: "한국경제",
        date: "2024-02-28",
        category: "사회",
        keywords: &["저출산", "합계출산율", "통계청", "인구"],
    },
    SampleArticle {
        id: "news-003",
        title: "저출산 고령화가 바꾸는 노동시장",
        content: "저출산과 고령화가 동시에 진행되면서 생산가능인구가 빠르게 줄고 있다. 기업들은 정년 연장과 외국인 인력 활용, 자동화 투자로 인력 공백을 메우려 하고 있다.",
        source: "매일경제",
        date: "2024-03-02",
        category: "경제",
        keywords: &["저출산", "고령화", "노동시장", "생산가능인구"],
    },
    SampleArticle {
        id: "news-004",
        title: "한국은행, 기준금리 3.5% 동결",
        content: "한국은행 금융통화위원회가 기준금리를 연 3.5%로 동결했다. 물가 상승률 둔화에도 가계부채와 환율 변동성을 고려해 신중한 입장을 유지했다.",
        source: "서울경제",
        date: "2024-02-22",
        category: "경제",
        keywords: &["기준금리", "한국은행", "물가", "가계부채"],
    },
    SampleArticle {
        id: "news-005",
        title: "반도체 수출 회복세 뚜렷",
        content: "인공지능 수요 증가에 힘입어 메모리 반도체 수출이 전년 대비 크게 늘었다. 고대역폭 메모리 출하가 늘며 업계 실적 개선 기대가 커지고 있다.",
        source: "전자신문",
        date: "2024-03-10",
        category: "경제",
        keywords: &["반도체", "수출", "인공지능", "메모리"],
    },
    SampleArticle {
        id: "news-006",
        title: "국회, 총선 앞두고 선거구 획정안 처리",
        content: "국회가 본회의를 열고 총선 선거구 획정안을 통과시켰다. 인구 변화에 따라 일부 지역구가 통합되거나 분구됐다.",
        source: "KBS",
        date: "2024-02-29",
        category: "정치",
        keywords: &["국회", "총선", "선거구"],
    },
    SampleArticle {
        id: "news-007",
        title: "전국 의대 증원 둘러싼 갈등 장기화",
        content: "의과대학 입학정원 확대를 둘러싼 정부와 의료계의 갈등이 이어지고 있다. 환자 단체는 진료 공백 장기화에 대한 우려를 나타냈다.",
        source: "MBC",
        date: "2024-03-12",
        category: "사회",
        keywords: &["의대증원", "의료계", "진료공백"],
    },
    SampleArticle {
        id: "news-008",
        title: "국립중앙박물관 특별전 관람객 50만 돌파",
        content: "국립중앙박물관에서 열리고 있는 고려 청자 특별전의 누적 관람객이 50만 명을 넘어섰다. 박물관은 관람 수요를 고려해 전시 기간을 연장하기로 했다.",
        source: "문화일보",
        date: "2024-03-08",
        category: "문화",
        keywords: &["박물관", "특별전", "청자"],
    },
    SampleArticle {
        id: "news-009",
        title: "K-드라마 글로벌 스트리밍 순위 상위권",
        content: "국내 제작 드라마가 글로벌 스트리밍 플랫폼 비영어권 순위에서 3주 연속 1위를 차지했다. 제작사는 후속 시즌 제작을 검토 중이다.",
        source: "스포츠조선",
        date: "2024-03-05",
        category: "문화",
        keywords: &["드라마", "스트리밍", "한류"],
    },
    SampleArticle {
        id: "news-010",
        title: "미 연준, 금리 인하 시점 신중론",
        content: "미국 연방준비제도 의장은 물가가 목표치로 안정된다는 확신이 들 때까지 금리 인하를 서두르지 않겠다고 밝혔다. 글로벌 금융시장은 인하 시점을 주시하고 있다.",
        source: "로이터",
        date: "2024-03-07",
        category: "국제",
        keywords: &["연준", "금리", "미국", "물가"],
    },
    SampleArticle {
        id: "news-011",
        title: "일본, 저출산 대책에 연 3조엔 투입",
        content: "일본 정부가 저출산 대책 재원으로 매년 3조엔 규모의 예산을 투입하기로 했다. 아동수당 확대와 보육 서비스 개선이 핵심이다.",
        source: "NHK",
        date: "2024-01-20",
        category: "국제",
        keywords: &["일본", "저출산", "아동수당", "보육"],
    },
    SampleArticle {
        id: "news-012",
        title: "국내 연구진, 초거대 언어모델 공개",
        content: "국내 연구진이 한국어 데이터로 학습한 초거대 언어모델을 공개했다. 검색 증강 생성 기법을 적용해 최신 정보에 대한 답변 정확도를 높였다.",
        source: "ZDNet Korea",
        date: "2024-03-14",
        category: "IT_과학",
        keywords: &["인공지능", "언어모델", "검색증강생성"],
    },
    SampleArticle {
        id: "news-013",
        title: "누리호 4차 발사 준비 착수",
        content: "한국항공우주연구원이 누리호 4차 발사를 위한 기체 조립에 들어갔다. 이번 발사에는 차세대 중형위성과 큐브위성이 함께 실린다.",
        source: "동아사이언스",
        date: "2024-02-18",
        category: "IT_과학",
        keywords: &["누리호", "우주", "위성"],
    },
];

impl SampleArticle {
    fn to_article(&self) -> NewsArticle {
        NewsArticle {
            id: self.id.to_string(),
            title: self.title.to_string(),
            content: self.content.to_string(),
            source: self.source.to_string(),
            date: self.date.to_string(),
            category: self.category.to_string(),
            keywords: self.keywords.iter().map(|k| k.to_string()).collect(),
        }
    }

    fn matches(&self, terms: &[String]) -> bool {
        terms.iter().any(|term| {
            self.title.to_lowercase().contains(term)
                || self.content.to_lowercase().contains(term)
                || self.keywords.iter().any(|k| k.to_lowercase().contains(term))
        })
    }
}

#[derive(Debug, Default, Clone)]
pub struct SampleNewsData;

impl SampleNewsData {
    fn newest_first<'a>(articles: impl Iterator<Item = &'a SampleArticle>, limit: usize) -> Vec<NewsArticle> {
        let mut selected: Vec<&SampleArticle> = articles.collect();
        selected.sort_by(|a, b| b.date.cmp(a.date));
        selected.into_iter().take(limit).map(SampleArticle::to_article).collect()
    }

    /// Articles containing any whitespace-separated term of `query`.
    pub fn search_news(&self, query: &str, limit: usize) -> Vec<NewsArticle> {
        let terms: Vec<String> = query.split_whitespace().map(str::to_lowercase).collect();
        if terms.is_empty() {
            return Vec::new();
        }
        Self::newest_first(ARTICLES.iter().filter(|a| a.matches(&terms)), limit)
    }

    pub fn get_news_by_id(&self, id: &str) -> Option<NewsArticle> {
        ARTICLES.iter().find(|a| a.id == id).map(SampleArticle::to_article)
    }

    pub fn get_recent_news(&self, limit: usize) -> Vec<NewsArticle> {
        Self::newest_first(ARTICLES.iter(), limit)
    }

    pub fn get_news_by_category(&self, category: &str, limit: usize) -> Vec<NewsArticle> {
        Self::newest_first(ARTICLES.iter().filter(|a| a.category == category), limit)
    }

    pub fn get_all_categories(&self) -> Vec<String> {
        CATEGORIES.iter().map(|c| c.to_string()).collect()
    }
}
