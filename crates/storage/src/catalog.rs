//! Built-in life-wheel questionnaire used by the seed tool and tests.

use wheel_core::model::{
    Catalog, CatalogError, LifeArea, LifeAreaId, Question, QuestionId, Subcategory, SubcategoryId,
};

struct AreaSeed {
    id: u64,
    name: &'static str,
    description: &'static str,
    color: &'static str,
    subcategories: [SubcategorySeed; 3],
}

struct SubcategorySeed {
    id: u64,
    name: &'static str,
    questions: [&'static str; 3],
}

const AREAS: [AreaSeed; 4] = [
    AreaSeed {
        id: 1,
        name: "Pessoal",
        description: "Saúde, mente e emoções",
        color: "#FF6B6B",
        subcategories: [
            SubcategorySeed {
                id: 101,
                name: "Saúde e disposição",
                questions: [
                    "Tenho energia suficiente para o meu dia a dia.",
                    "Durmo bem e acordo descansado.",
                    "Pratico atividade física com regularidade.",
                ],
            },
            SubcategorySeed {
                id: 102,
                name: "Desenvolvimento intelectual",
                questions: [
                    "Dedico tempo a aprender coisas novas.",
                    "Leio ou estudo com frequência.",
                    "Sinto que a minha mente é estimulada.",
                ],
            },
            SubcategorySeed {
                id: 103,
                name: "Equilíbrio emocional",
                questions: [
                    "Lido bem com o stress.",
                    "Reconheço e aceito as minhas emoções.",
                    "Recupero rapidamente de contratempos.",
                ],
            },
        ],
    },
    AreaSeed {
        id: 2,
        name: "Qualidade de Vida",
        description: "Felicidade, lazer e sentido",
        color: "#4ECDC4",
        subcategories: [
            SubcategorySeed {
                id: 201,
                name: "Plenitude e felicidade",
                questions: [
                    "Sinto-me feliz com a vida que levo.",
                    "Tenho momentos de gratidão no dia a dia.",
                    "Sinto-me realizado como pessoa.",
                ],
            },
            SubcategorySeed {
                id: 202,
                name: "Criatividade, hobbies e diversão",
                questions: [
                    "Tenho tempo para os meus hobbies.",
                    "Divirto-me com regularidade.",
                    "Expresso a minha criatividade.",
                ],
            },
            SubcategorySeed {
                id: 203,
                name: "Espiritualidade",
                questions: [
                    "Sinto ligação a algo maior do que eu.",
                    "Reservo tempo para reflexão ou meditação.",
                    "Os meus valores guiam as minhas decisões.",
                ],
            },
        ],
    },
    AreaSeed {
        id: 3,
        name: "Profissional",
        description: "Carreira, finanças e impacto",
        color: "#45B7D1",
        subcategories: [
            SubcategorySeed {
                id: 301,
                name: "Realização e propósito",
                questions: [
                    "O meu trabalho tem significado para mim.",
                    "Sinto que estou a evoluir profissionalmente.",
                    "Uso os meus talentos no trabalho.",
                ],
            },
            SubcategorySeed {
                id: 302,
                name: "Recursos financeiros",
                questions: [
                    "Os meus rendimentos cobrem as minhas necessidades.",
                    "Tenho reservas para imprevistos.",
                    "Planeio o meu futuro financeiro.",
                ],
            },
            SubcategorySeed {
                id: 303,
                name: "Contribuição social",
                questions: [
                    "Contribuo para a minha comunidade.",
                    "Ajudo outras pessoas com regularidade.",
                    "Sinto que deixo uma marca positiva.",
                ],
            },
        ],
    },
    AreaSeed {
        id: 4,
        name: "Relacionamentos",
        description: "Família, afetos e vida social",
        color: "#FFA07A",
        subcategories: [
            SubcategorySeed {
                id: 401,
                name: "Família",
                questions: [
                    "Passo tempo de qualidade com a família.",
                    "Sinto-me apoiado pela minha família.",
                    "A comunicação em casa é saudável.",
                ],
            },
            SubcategorySeed {
                id: 402,
                name: "Desenvolvimento de emoções",
                questions: [
                    "Consigo expressar afeto às pessoas próximas.",
                    "Tenho uma relação amorosa satisfatória.",
                    "Sinto-me compreendido por quem amo.",
                ],
            },
            SubcategorySeed {
                id: 403,
                name: "Vida social",
                questions: [
                    "Tenho amigos com quem posso contar.",
                    "Participo em atividades sociais.",
                    "Conheço pessoas novas com facilidade.",
                ],
            },
        ],
    },
];

/// Question ids are `subcategory_id * 100 + n`, with `n` starting at 1.
#[must_use]
pub fn default_areas() -> Vec<LifeArea> {
    AREAS
        .iter()
        .zip(1u32..)
        .map(|(area, order)| {
            let area_id = LifeAreaId::new(area.id);
            let subcategories = area
                .subcategories
                .iter()
                .map(|sub| {
                    let sub_id = SubcategoryId::new(sub.id);
                    let questions = sub
                        .questions
                        .iter()
                        .zip(1u64..)
                        .map(|(text, n)| {
                            Question::new(QuestionId::new(sub.id * 100 + n), sub_id, *text)
                        })
                        .collect();
                    Subcategory::new(sub_id, area_id, sub.name, questions)
                })
                .collect();
            LifeArea::new(area_id, area.name, area.color, subcategories)
                .with_description(area.description)
                .with_display_order(order)
        })
        .collect()
}

/// The default catalog: four areas, three subcategories each, three questions each.
///
/// # Errors
///
/// Returns `CatalogError` if the built-in table is inconsistent.
pub fn default_catalog() -> Result<Catalog, CatalogError> {
    Catalog::new(default_areas())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_catalog_shape() {
        let catalog = default_catalog().unwrap();
        assert_eq!(catalog.step_count(), 4);
        assert_eq!(catalog.subcategories().count(), 12);
        assert_eq!(catalog.question_count(), 36);
        assert_eq!(catalog.step_of(QuestionId::new(40303)), Some(3));
        assert_eq!(catalog.areas()[1].color, "#4ECDC4");
    }
}
