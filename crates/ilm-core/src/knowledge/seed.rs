//! Built-in topics. Keys here are the targets of the default keyword rules.

use super::KnowledgeEntry;

pub fn seed_entries() -> Vec<KnowledgeEntry> {
    vec![
        KnowledgeEntry::new(
            "five_pillars",
            "What are the five pillars of Islam?",
            "The five pillars of Islam are the foundation of a Muslim's practice: \
             the Shahada (testimony of faith), Salah (the five daily prayers), \
             Zakat (obligatory charity), Sawm (fasting during Ramadan) and Hajj \
             (pilgrimage to Makkah for those who are able).",
            &["Sahih al-Bukhari 8", "Sahih Muslim 16"],
        ),
        KnowledgeEntry::new(
            "islam",
            "What is Islam?",
            "Islam means submission to the will of God (Allah). It is a monotheistic \
             faith revealed through a line of prophets ending with Muhammad, peace be \
             upon him, with the Quran as its scripture and the Sunnah as its lived example.",
            &["Quran 3:19", "Quran 5:3"],
        ),
        KnowledgeEntry::new(
            "shahada",
            "What is the Shahada?",
            "The Shahada is the testimony of faith: \"There is no god but Allah, and \
             Muhammad is the Messenger of Allah.\" Sincerely declaring it is the first \
             pillar of Islam.",
            &["Quran 47:19", "Sahih al-Bukhari 8"],
        ),
        KnowledgeEntry::new(
            "salah",
            "How many times do Muslims pray each day?",
            "Muslims perform five obligatory prayers each day: Fajr (dawn), Dhuhr \
             (midday), Asr (afternoon), Maghrib (sunset) and Isha (night). Each is \
             offered within its appointed time facing the Kaaba in Makkah.",
            &["Quran 4:103", "Quran 2:43", "Quran 29:45"],
        ),
        KnowledgeEntry::new(
            "zakat",
            "What is Zakat?",
            "Zakat is the obligatory annual charity of 2.5% on savings that exceed the \
             nisab threshold and have been held for a full lunar year. It is given to \
             the eligible categories named in the Quran, such as the poor and the needy.",
            &["Quran 9:60", "Quran 2:43"],
        ),
        KnowledgeEntry::new(
            "sawm",
            "Why do Muslims fast during Ramadan?",
            "Fasting in Ramadan means abstaining from food, drink and marital relations \
             from dawn until sunset. It was prescribed so that believers may attain \
             taqwa (God-consciousness), and it commemorates the month the Quran was revealed.",
            &["Quran 2:183", "Quran 2:185"],
        ),
        KnowledgeEntry::new(
            "hajj",
            "What is Hajj?",
            "Hajj is the pilgrimage to Makkah performed in the month of Dhul-Hijjah. It \
             is obligatory once in a lifetime for every adult Muslim who is physically \
             and financially able to undertake it.",
            &["Quran 3:97", "Quran 22:27"],
        ),
        KnowledgeEntry::new(
            "quran",
            "What is the Quran?",
            "The Quran is the word of Allah revealed to the Prophet Muhammad through the \
             angel Jibril over about twenty-three years. It has 114 surahs and is \
             preserved in its original Arabic.",
            &["Quran 2:2", "Quran 15:9", "Quran 96:1-5"],
        ),
        KnowledgeEntry::new(
            "prophet_muhammad",
            "Who is the Prophet Muhammad?",
            "Muhammad, peace be upon him, is the final messenger of Allah, born in \
             Makkah around 570 CE. He received the revelation of the Quran and his \
             example (the Sunnah) guides Muslim life.",
            &["Quran 33:40", "Quran 21:107"],
        ),
        KnowledgeEntry::new(
            "tawhid",
            "What is Tawhid?",
            "Tawhid is the oneness of Allah: He is One, without partner, the Eternal \
             Refuge, who neither begets nor is born, and there is none comparable to Him.",
            &["Quran 112:1-4"],
        ),
        KnowledgeEntry::new(
            "articles_of_faith",
            "What are the six articles of faith?",
            "The six articles of faith (iman) are belief in Allah, His angels, His \
             revealed books, His messengers, the Last Day, and divine decree (qadar), \
             both its good and its bad.",
            &["Sahih Muslim 8", "Quran 2:285", "Quran 4:136"],
        ),
        KnowledgeEntry::new(
            "sabr",
            "What does Islam teach about patience?",
            "Sabr (patience) is praised throughout the Quran. Believers are told to seek \
             help through patience and prayer, and are reminded that with hardship \
             comes ease.",
            &["Quran 2:153", "Quran 94:5-6"],
        ),
        KnowledgeEntry::new(
            "dua",
            "How do I make dua?",
            "Dua is personal supplication to Allah and can be made at any time, in any \
             language. Allah says He is near and responds to the one who calls upon Him.",
            &["Quran 2:186", "Quran 40:60"],
        ),
    ]
}
